//! Integration tests for [`stream_edit::StreamEditor`] on tokio's paused clock.
//!
//! Chunks are pushed at fixed virtual offsets; the mock bot records each edit with its virtual
//! time, so spacing, coalescing and the final flush can be asserted exactly.

mod common;

use common::mock_bot::MockBot;
use greet_core::{Bot, Chat};
use std::sync::Arc;
use std::time::Duration;
use stream_edit::{EditTarget, StreamEditor, ThrottleConfig};
use tokio::time::{sleep, sleep_until, Instant};

const T: Duration = Duration::from_millis(500);
const MARKER: &str = " ▌";

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn target() -> EditTarget {
    EditTarget::new(
        Chat {
            id: 42,
            chat_type: "private".to_string(),
        },
        "7",
    )
}

fn spawn_editor(bot: &Arc<MockBot>) -> StreamEditor {
    StreamEditor::spawn(
        bot.clone() as Arc<dyn Bot>,
        target(),
        ThrottleConfig::new(T, MARKER),
    )
}

/// **Test: A/AB/ABC at 0/10/20ms, completion "ABC." at 30ms.**
///
/// **Expected:** immediate "A ▌" at 0; the deferred edit for t=500 is cancelled; final "ABC." at 30.
#[tokio::test(start_paused = true)]
async fn test_burst_then_completion_cancels_deferred_edit() {
    let bot = Arc::new(MockBot::new());
    let t0 = Instant::now();
    let editor = spawn_editor(&bot);

    editor.push_chunk("A");
    sleep(ms(10)).await;
    editor.push_chunk("AB");
    sleep(ms(10)).await;
    editor.push_chunk("ABC");
    sleep(ms(10)).await;
    editor.finish("ABC.").await.unwrap();

    // Nothing else fires later.
    sleep(ms(2000)).await;

    let edits = bot.edits();
    assert_eq!(bot.edit_texts(), vec!["A ▌", "ABC."]);
    assert_eq!(edits[0].at - t0, ms(0));
    assert_eq!(edits[1].at - t0, ms(30));
    assert_eq!(edits[1].message_id, "7");
    assert_eq!(edits[1].chat_id, 42);
}

/// **Test: chunks at 0/600/1300ms each exceed the interval → three immediate marked edits.**
#[tokio::test(start_paused = true)]
async fn test_spaced_chunks_edit_immediately() {
    let bot = Arc::new(MockBot::new());
    let t0 = Instant::now();
    let editor = spawn_editor(&bot);

    editor.push_chunk("Dear");
    sleep_until(t0 + ms(600)).await;
    editor.push_chunk("Dear Ann,");
    sleep_until(t0 + ms(1300)).await;
    editor.push_chunk("Dear Ann, happy");
    sleep(ms(1)).await;

    let edits = bot.edits();
    assert_eq!(
        bot.edit_texts(),
        vec!["Dear ▌", "Dear Ann, ▌", "Dear Ann, happy ▌"]
    );
    let offsets: Vec<Duration> = edits.iter().map(|e| e.at - t0).collect();
    assert_eq!(offsets, vec![ms(0), ms(600), ms(1300)]);

    editor.finish("Dear Ann, happy birthday!").await.unwrap();
    assert_eq!(bot.edit_texts().last().unwrap(), "Dear Ann, happy birthday!");
}

/// **Test: a deferred edit fires at last_edit + T with the newest chunk; intermediate ones are coalesced.**
#[tokio::test(start_paused = true)]
async fn test_deferred_edit_sends_newest_chunk() {
    let bot = Arc::new(MockBot::new());
    let t0 = Instant::now();
    let editor = spawn_editor(&bot);

    editor.push_chunk("A");
    sleep_until(t0 + ms(100)).await;
    editor.push_chunk("AB");
    sleep_until(t0 + ms(200)).await;
    editor.push_chunk("ABC");
    sleep_until(t0 + ms(1200)).await;
    editor.finish("ABCD").await.unwrap();

    let edits = bot.edits();
    assert_eq!(bot.edit_texts(), vec!["A ▌", "ABC ▌", "ABCD"]);
    assert_eq!(edits[1].at - t0, ms(500));
    assert_eq!(edits[2].at - t0, ms(1200));
}

/// **Test: completion identical to the last chunk still produces exactly one final edit.**
#[tokio::test(start_paused = true)]
async fn test_identical_completion_not_suppressed() {
    let bot = Arc::new(MockBot::new());
    let editor = spawn_editor(&bot);

    editor.push_chunk("Happy New Year!");
    sleep(ms(5)).await;
    editor.finish("Happy New Year!").await.unwrap();
    sleep(ms(2000)).await;

    assert_eq!(
        bot.edit_texts(),
        vec!["Happy New Year! ▌", "Happy New Year!"]
    );
}

/// **Test: completion with no chunks at all still sends the final edit.**
#[tokio::test(start_paused = true)]
async fn test_completion_without_chunks() {
    let bot = Arc::new(MockBot::new());
    let editor = spawn_editor(&bot);

    editor.finish("Fallback greeting").await.unwrap();

    assert_eq!(bot.edit_texts(), vec!["Fallback greeting"]);
}

/// **Test: a failed intermediate edit is swallowed; the stream continues and the final edit succeeds.**
#[tokio::test(start_paused = true)]
async fn test_intermediate_edit_failure_is_swallowed() {
    let bot = Arc::new(MockBot::new());
    bot.fail_edit_with_text("A ▌");
    let t0 = Instant::now();
    let editor = spawn_editor(&bot);

    editor.push_chunk("A");
    sleep_until(t0 + ms(700)).await;
    editor.push_chunk("AB");
    sleep(ms(1)).await;
    let result = editor.finish("AB!").await;

    assert!(result.is_ok());
    assert_eq!(bot.edit_texts(), vec!["A ▌", "AB ▌", "AB!"]);
}

/// **Test: a failed final edit is returned to the caller.**
#[tokio::test(start_paused = true)]
async fn test_final_edit_failure_propagates() {
    let bot = Arc::new(MockBot::new());
    bot.fail_all_edits();
    let editor = spawn_editor(&bot);

    editor.push_chunk("A");
    sleep(ms(1)).await;
    let result = editor.finish("A.").await;

    assert!(result.is_err());
    assert_eq!(bot.edit_texts(), vec!["A ▌", "A."]);
}

/// **Test: chunks pushed through a cloned ChunkSender (as a stream callback does) are handled like push_chunk.**
#[tokio::test(start_paused = true)]
async fn test_chunk_sender_from_callback() {
    let bot = Arc::new(MockBot::new());
    let editor = spawn_editor(&bot);
    let sender = editor.chunk_sender();
    let on_chunk = move |text: String| sender.send(text);

    on_chunk("Hi".to_string());
    on_chunk("Hi there".to_string());
    sleep(ms(1)).await;
    editor.finish("Hi there!").await.unwrap();

    assert_eq!(bot.edit_texts(), vec!["Hi ▌", "Hi there!"]);
}

/// **Test: slow edits never overlap; chunks that arrive during an in-flight edit are coalesced.**
///
/// **Setup:** every edit takes 300ms; chunks every 50ms for 1.5s.
/// **Expected:** no overlap, starts at least T apart, final edit carries the completion text.
#[tokio::test(start_paused = true)]
async fn test_slow_edits_do_not_overlap() {
    let bot = Arc::new(MockBot::new());
    bot.set_edit_delay(ms(300));
    let t0 = Instant::now();
    let editor = spawn_editor(&bot);

    let mut text = String::new();
    for i in 0..30u64 {
        text.push('x');
        sleep_until(t0 + ms(i * 50)).await;
        editor.push_chunk(text.clone());
    }
    editor.finish("done").await.unwrap();

    let edits = bot.edits();
    assert!(!bot.saw_overlapping_edits());
    let non_final = &edits[..edits.len() - 1];
    for pair in non_final.windows(2) {
        assert!(pair[1].at - pair[0].at >= T);
    }
    assert_eq!(edits.last().unwrap().text, "done");
    assert!(non_final.len() < 30);
}

/// **Test: chunks queued behind an edit slower than T are folded; only the newest is sent next.**
///
/// **Setup:** every edit takes 600ms; "A"@0, "AB"@100, "ABC"@200, completion "ABC."@3000.
/// **Expected:** "AB" is never sent; "ABC ▌" goes out at 600 when the first edit returns.
#[tokio::test(start_paused = true)]
async fn test_slow_edit_sends_newest_queued_chunk() {
    let bot = Arc::new(MockBot::new());
    bot.set_edit_delay(ms(600));
    let t0 = Instant::now();
    let editor = spawn_editor(&bot);

    editor.push_chunk("A");
    sleep_until(t0 + ms(100)).await;
    editor.push_chunk("AB");
    sleep_until(t0 + ms(200)).await;
    editor.push_chunk("ABC");
    sleep_until(t0 + ms(3000)).await;
    editor.finish("ABC.").await.unwrap();

    let edits = bot.edits();
    assert_eq!(bot.edit_texts(), vec!["A ▌", "ABC ▌", "ABC."]);
    let offsets: Vec<Duration> = edits.iter().map(|e| e.at - t0).collect();
    assert_eq!(offsets, vec![ms(0), ms(600), ms(3000)]);
}

/// **Test: a completion queued during a slow in-flight edit is the very next edit.**
///
/// **Setup:** every edit takes 600ms; "A"@0, "AB"@100, completion "AB."@200.
/// **Expected:** the queued "AB" chunk is dropped; final "AB." is sent at 600 with no marked edit
/// in between.
#[tokio::test(start_paused = true)]
async fn test_completion_during_slow_edit_skips_stale_chunks() {
    let bot = Arc::new(MockBot::new());
    bot.set_edit_delay(ms(600));
    let t0 = Instant::now();
    let editor = spawn_editor(&bot);

    editor.push_chunk("A");
    sleep_until(t0 + ms(100)).await;
    editor.push_chunk("AB");
    sleep_until(t0 + ms(200)).await;
    editor.finish("AB.").await.unwrap();

    let edits = bot.edits();
    assert_eq!(bot.edit_texts(), vec!["A ▌", "AB."]);
    assert_eq!(edits[1].at - t0, ms(600));
    assert!(!bot.saw_overlapping_edits());
}

// ---------- Property-style check over generated arrival patterns ----------

/// Small deterministic xorshift so patterns are reproducible.
struct XorShift(u64);

impl XorShift {
    fn next(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }
}

/// Generates strictly increasing arrival offsets (ms), gaps in 1..=max_gap.
fn arrival_pattern(rng: &mut XorShift, len: usize, max_gap: u64) -> Vec<u64> {
    let mut t = 0;
    (0..len)
        .map(|_| {
            t += 1 + rng.next() % max_gap;
            t
        })
        .collect()
}

/// **Test: for many arrival patterns, the observed edit sequence satisfies the throttle invariants.**
///
/// - consecutive edits ≥ T apart except the final one;
/// - the final edit equals the completion text exactly;
/// - every non-final edit is the marked text of the newest chunk known at send time.
#[tokio::test(start_paused = true)]
async fn test_invariants_hold_for_generated_patterns() {
    let mut rng = XorShift(0x9E37_79B9_7F4A_7C15);

    for case in 0..40 {
        let bot = Arc::new(MockBot::new());
        let len = 1 + (rng.next() % 25) as usize;
        let max_gap = [5, 40, 180, 700][case % 4];
        let offsets = arrival_pattern(&mut rng, len, max_gap);
        let chunks: Vec<String> = (1..=len).map(|n| "w".repeat(n)).collect();
        let completion = format!("{}.", chunks.last().unwrap());

        let t0 = Instant::now();
        let editor = spawn_editor(&bot);
        for (offset, chunk) in offsets.iter().zip(&chunks) {
            sleep_until(t0 + ms(*offset)).await;
            editor.push_chunk(chunk.clone());
        }
        let finish_at = offsets.last().unwrap() + 1 + rng.next() % 900;
        sleep_until(t0 + ms(finish_at)).await;
        editor.finish(completion.clone()).await.unwrap();

        let edits = bot.edits();
        let (last, non_final) = edits.split_last().unwrap();
        assert_eq!(last.text, completion, "case {case}");
        assert_eq!(last.at - t0, ms(finish_at), "case {case}");

        for pair in non_final.windows(2) {
            assert!(pair[1].at - pair[0].at >= T, "case {case}: edits closer than T");
        }

        for edit in non_final {
            let sent = edit.at - t0;
            let text = edit
                .text
                .strip_suffix(MARKER)
                .unwrap_or_else(|| panic!("case {case}: missing marker in {:?}", edit.text));
            let index = chunks.iter().position(|c| c == text).unwrap();
            // Chunks pushed strictly before the edit were already handled; one pushed at the
            // same instant may or may not have been.
            let newest_before = offsets.iter().rposition(|o| ms(*o) < sent);
            let newest_at_or_before = offsets.iter().rposition(|o| ms(*o) <= sent).unwrap();
            if let Some(before) = newest_before {
                assert!(index >= before, "case {case}: stale text sent");
            }
            assert!(index <= newest_at_or_before, "case {case}: text from the future");
        }

        // Texts never regress.
        let indices: Vec<usize> = non_final
            .iter()
            .filter_map(|e| e.text.strip_suffix(MARKER))
            .filter_map(|t| chunks.iter().position(|c| c == t))
            .collect();
        assert!(indices.windows(2).all(|w| w[0] < w[1]), "case {case}");
    }
}
