//! End-to-end orchestration scenarios and timeline properties.

use vreel_models::{
    GeneratedScript, Keyword, KeywordColor, Pose, SceneData, SceneType, ScriptSegment,
    SegmentType, TimestampSegment,
};
use vreel_timeline::{orchestrate_scenes, orchestrate_segments};

fn script(segments: Vec<ScriptSegment>) -> GeneratedScript {
    let full = segments
        .iter()
        .map(|s| s.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    GeneratedScript {
        script: full,
        keywords: vec![Keyword {
            word: "Rust".to_string(),
            color: KeywordColor::Red,
        }],
        segments,
    }
}

fn four_part_script() -> GeneratedScript {
    script(vec![
        ScriptSegment::new("Still debugging at midnight? Let's fix that.", SegmentType::Opening),
        ScriptSegment::new("Memory bugs eat your weekend again and again", SegmentType::Pain),
        ScriptSegment::new("The borrow checker catches them before you ship", SegmentType::Solution),
        ScriptSegment::new("Follow for more Rust tips", SegmentType::Closing),
    ])
}

fn matching_timestamps() -> Vec<TimestampSegment> {
    vec![
        TimestampSegment::new(0.0, 2.5, "Still debugging at midnight? Let's fix that."),
        TimestampSegment::new(2.5, 5.0, "Memory bugs eat your weekend again and again."),
        TimestampSegment::new(5.0, 9.5, "The borrow checker catches them before you ship."),
        TimestampSegment::new(9.5, 11.5, "Follow for more Rust tips!"),
    ]
}

fn assert_timeline_invariants(scenes: &[SceneData], total: f64) {
    assert!(!scenes.is_empty());
    assert_eq!(scenes[0].start, 0.0);
    for pair in scenes.windows(2) {
        assert_eq!(pair[0].end, pair[1].start, "gap or overlap between scenes");
    }
    assert_eq!(scenes.last().unwrap().end, total);
    for scene in scenes {
        assert!(scene.end > scene.start, "non-positive scene {:?}", scene);
    }
}

#[test]
fn matching_transcript_reproduces_intervals() {
    let result = orchestrate_scenes(&four_part_script(), &matching_timestamps());

    let intervals: Vec<(f64, f64)> = result.scenes.iter().map(|s| (s.start, s.end)).collect();
    assert_eq!(
        intervals,
        vec![(0.0, 2.5), (2.5, 5.0), (5.0, 9.5), (9.5, 11.5)]
    );
    assert_eq!(result.matched_segments, 4);
    assert_eq!(result.total_duration, 11.5);

    let kinds: Vec<(SceneType, Pose)> = result
        .scenes
        .iter()
        .map(|s| (s.scene_type, s.pose))
        .collect();
    assert_eq!(
        kinds,
        vec![
            (SceneType::Title, Pose::Peek),
            (SceneType::Pain, Pose::Point),
            (SceneType::Emphasis, Pose::Think),
            (SceneType::Circle, Pose::Celebrate),
        ]
    );
    assert_eq!(result.scenes[0].title.as_deref(), Some("Still debugging at midnight?"));
    assert_eq!(result.scenes[0].subtitle.as_deref(), Some("Let's fix that."));
    assert_eq!(result.scenes[2].number.as_deref(), Some("2"));
}

#[test]
fn no_transcript_uses_three_second_slots() {
    let segments = vec![
        ScriptSegment::new("one", SegmentType::Opening),
        ScriptSegment::new("two", SegmentType::Pain),
        ScriptSegment::new("three", SegmentType::Closing),
    ];
    let result = orchestrate_segments(&segments, &[]);

    let intervals: Vec<(f64, f64)> = result.scenes.iter().map(|s| (s.start, s.end)).collect();
    assert_eq!(intervals, vec![(0.0, 3.0), (3.0, 6.0), (6.0, 9.0)]);
    assert_eq!(result.matched_segments, 0);
    assert_eq!(result.fallback_segments(), 3);
}

#[test]
fn unmatched_segment_keeps_even_split() {
    let segments = vec![
        ScriptSegment::new("Still debugging at midnight?", SegmentType::Opening),
        ScriptSegment::new("zebra quartz xylophone", SegmentType::Pain),
        ScriptSegment::new("Follow for more Rust tips", SegmentType::Closing),
    ];
    let timestamps = vec![
        TimestampSegment::new(0.0, 4.0, "Still debugging at midnight?"),
        TimestampSegment::new(4.0, 8.0, "memory bugs everywhere"),
        TimestampSegment::new(8.0, 12.0, "Follow for more Rust tips"),
    ];
    let result = orchestrate_segments(&segments, &timestamps);

    // Opening matches [0, 4]; the middle segment shares nothing with any
    // transcript line and keeps its provisional slot.
    assert_eq!(result.scenes[0].end, 4.0);
    assert_eq!(result.scenes[1].start, 4.0);
    assert!((result.scenes[1].end - 8.0).abs() < 1e-9);
    assert_timeline_invariants(&result.scenes, 12.0);
}

#[test]
fn single_segment_spans_whole_narration() {
    let segments = vec![ScriptSegment::new("nothing in common", SegmentType::Closing)];
    let timestamps = vec![TimestampSegment::new(0.0, 11.5, "entirely different words")];
    let result = orchestrate_segments(&segments, &timestamps);

    assert_eq!(result.scenes.len(), 1);
    assert_eq!((result.scenes[0].start, result.scenes[0].end), (0.0, 11.5));
}

#[test]
fn empty_script_yields_no_scenes() {
    let result = orchestrate_segments(&[], &matching_timestamps());
    assert!(result.scenes.is_empty());
    assert_eq!(result.fallback_segments(), 0);
}

#[test]
fn chaining_holds_for_noisy_transcripts() {
    let segments: Vec<ScriptSegment> = [
        "alpha beta gamma",
        "delta epsilon",
        "alpha beta gamma",
        "zeta eta theta iota",
        "kappa",
        "delta epsilon",
    ]
    .iter()
    .map(|t| ScriptSegment::new(*t, SegmentType::Pain))
    .collect();

    // Out-of-order texts, gaps, and a repeated line.
    let timestamps = vec![
        TimestampSegment::new(0.0, 1.2, "delta epsilon"),
        TimestampSegment::new(1.5, 6.0, "zeta eta theta iota"),
        TimestampSegment::new(6.0, 6.4, "alpha beta gamma"),
        TimestampSegment::new(7.0, 13.75, "kappa"),
        TimestampSegment::new(13.9, 14.0, "alpha beta gamma"),
    ];

    let result = orchestrate_segments(&segments, &timestamps);
    assert_eq!(result.scenes.len(), segments.len());
    assert_timeline_invariants(&result.scenes, 14.0);
}

#[test]
fn scene_count_matches_segment_count() {
    let result = orchestrate_scenes(&four_part_script(), &matching_timestamps()[..2]);
    assert_eq!(result.scenes.len(), 4);
    assert_timeline_invariants(&result.scenes, 5.0);
}

#[test]
fn output_is_deterministic() {
    let script = four_part_script();
    let timestamps = matching_timestamps();

    let first = serde_json::to_string(&orchestrate_scenes(&script, &timestamps).scenes).unwrap();
    let second = serde_json::to_string(&orchestrate_scenes(&script, &timestamps).scenes).unwrap();
    assert_eq!(first, second);
}
