use std::path::{Path, PathBuf};

use mkvstrip::adapters::MediaInfoProbe;
use mkvstrip::domain::rules::{AlignmentChecker, ExtractionTag, TrackSelector};
use mkvstrip::planner::naming::{edited_path, is_edited};
use mkvstrip::*;

mod test_utils {
    use super::*;

    pub fn fixture(name: &str) -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("tests")
            .join("fixtures")
            .join(name)
    }

    /// Load a saved mediainfo document as if it described `media_path`
    pub fn load(name: &str, media_path: &str) -> MediaFile {
        MediaInfoProbe::from_json_file(&fixture(name), Path::new(media_path))
            .expect("fixture should parse")
    }

    pub fn heat() -> MediaFile {
        load("remux.json", "/media/Heat (1995) [1080p].mkv")
    }

    pub fn policy(audio: &[&str], subtitles: &[&str], forced: bool, external: bool) -> Policy {
        Policy::new(audio, subtitles, forced, external).expect("valid policy")
    }

    pub fn remux(plan: EditPlan) -> RemuxPlan {
        match plan {
            EditPlan::Remux(plan) => plan,
            other => panic!("expected a remux plan, got {:?}", other),
        }
    }

    pub fn cleanup(plan: EditPlan) -> CleanupPlan {
        match plan {
            EditPlan::Cleanup(plan) => plan,
            other => panic!("expected a cleanup plan, got {:?}", other),
        }
    }
}

use test_utils::*;

#[test]
fn test_fixture_is_probed_into_kinds() {
    let file = heat();

    assert_eq!(file.video_tracks.len(), 1);
    assert_eq!(file.audio_tracks.len(), 3);
    assert_eq!(file.subtitle_tracks.len(), 3);
    assert!(file.has_chapters());
    assert_eq!(file.general.attachments, vec!["cover.jpg"]);
    assert_eq!(file.audio_tracks[1].stream_size, Some(8_000_000));
    assert_eq!(
        file.audio_tracks[1].commercial_name.as_deref(),
        Some("DTS-HD Master Audio")
    );
}

#[test]
fn test_selection_is_a_partition() {
    let file = heat();

    for (audio, subtitles, forced, external) in [
        (&["en"][..], &["en"][..], false, false),
        (&["de", "en"][..], &[][..], false, false),
        (&["fr"][..], &["en"][..], true, false),
        (&["en"][..], &["en"][..], false, true),
    ] {
        let policy = policy(audio, subtitles, forced, external);
        let audio_result = TrackSelector::select(&file.audio_tracks, TrackKind::Audio, &policy).unwrap();
        let subtitle_result =
            TrackSelector::select(&file.subtitle_tracks, TrackKind::Subtitle, &policy).unwrap();

        assert!(audio_result.verify_partition(&file.audio_tracks).is_ok());
        assert!(subtitle_result.verify_partition(&file.subtitle_tracks).is_ok());
        assert_eq!(
            audio_result.keep.len() + audio_result.remove.len() + audio_result.extract.len(),
            3
        );
        assert!(audio_result.extract.is_empty());
    }
}

#[test]
fn test_remux_orders_by_language_then_size() {
    let plan = remux(
        PlanBuilder::default()
            .build(&heat(), &policy(&["en"], &["en"], false, false))
            .unwrap(),
    );

    // The 8 MB track outranks the 5 MB one; the forced subtitle leads.
    assert_eq!(plan.track_order, vec![0, 2, 1, 5, 4]);
    assert_eq!(plan.removed, vec![3, 6]);
    assert_eq!(plan.title, "Heat (1995)");
    assert_eq!(plan.output, PathBuf::from("/media/Heat (1995) [1080p].mkv.tmp"));

    let audio = plan.audio.tracks();
    assert_eq!(audio[0].name, "DTS-HD Master Audio");
    assert_eq!(audio[0].default, Some(true));
    assert_eq!(audio[1].name, "Dolby Digital");
    assert_eq!(audio[1].default, Some(false));

    let subtitles = plan.subtitles.tracks();
    assert_eq!(subtitles[0].name, "English (Forced)");
    assert_eq!(subtitles[1].name, "English");
}

#[test]
fn test_language_priority_wins_over_size() {
    let plan = remux(
        PlanBuilder::default()
            .build(&heat(), &policy(&["de", "en"], &["en"], false, false))
            .unwrap(),
    );

    assert_eq!(plan.track_order, vec![0, 3, 2, 1, 5, 4]);
    assert_eq!(plan.removed, vec![6]);
}

#[test]
fn test_forced_only_drops_regular_subtitles() {
    let plan = remux(
        PlanBuilder::default()
            .build(&heat(), &policy(&["en"], &["en"], true, false))
            .unwrap(),
    );

    assert_eq!(plan.subtitles.tracks().len(), 1);
    assert_eq!(plan.subtitles.tracks()[0].stream_order, 5);
    assert_eq!(plan.removed, vec![3, 4, 6]);
}

#[test]
fn test_no_subtitle_language_drops_all_subtitles() {
    let plan = remux(
        PlanBuilder::default()
            .build(&heat(), &policy(&["en"], &[], false, false))
            .unwrap(),
    );

    assert_eq!(plan.subtitles, TrackSet::DropAll);
    assert!(plan.to_merge_args().contains(&"--no-subtitles".to_string()));
    assert_eq!(plan.track_order, vec![0, 2, 1]);
}

#[test]
fn test_external_subtitles_are_extracted_with_tags() {
    let plan = remux(
        PlanBuilder::default()
            .build(&heat(), &policy(&["en"], &["en"], false, true))
            .unwrap(),
    );

    assert_eq!(plan.subtitles, TrackSet::DropAll);
    assert_eq!(plan.extractions.len(), 2);
    assert_eq!(plan.extractions[0].stream_order, 4);
    assert_eq!(plan.extractions[0].tag, ExtractionTag::Plain(0));
    assert_eq!(
        plan.extractions[0].destination,
        PathBuf::from("/media/Heat (1995) [1080p][edited].en.srt")
    );
    assert_eq!(plan.extractions[1].tag, ExtractionTag::Forced);
    assert_eq!(
        plan.extractions[1].destination,
        PathBuf::from("/media/Heat (1995) [1080p][edited].en.forced.srt")
    );

    let args = plan.to_extract_args().unwrap();
    assert_eq!(args[0], "/media/Heat (1995) [1080p].mkv");
    assert_eq!(args[1], "tracks");
    assert_eq!(args[2], "4:/media/Heat (1995) [1080p][edited].en.srt");
    assert_eq!(args[3], "5:/media/Heat (1995) [1080p][edited].en.forced.srt");
}

#[test]
fn test_merge_arguments() {
    let plan = remux(
        PlanBuilder::new(PlanOptions {
            tmp_dir: Some(PathBuf::from("/scratch")),
        })
        .build(&heat(), &policy(&["en"], &["en"], true, false))
        .unwrap(),
    );

    let args = plan.to_merge_args();
    let expected: Vec<String> = [
        "--output",
        "/scratch/Heat (1995) [1080p].mkv.tmp",
        "--title",
        "Heat (1995)",
        "--no-chapters",
        "--no-attachments",
        "--no-track-tags",
        "--disable-track-statistics-tags",
        "--track-name",
        "0:",
        "--language",
        "0:und",
        "--default-track",
        "2:1",
        "--track-name",
        "2:DTS-HD Master Audio",
        "--default-track",
        "1:0",
        "--track-name",
        "1:Dolby Digital",
        "--audio-tracks",
        "2,1",
        "--default-track",
        "5:1",
        "--track-name",
        "5:English (Forced)",
        "--subtitle-tracks",
        "5",
        "--track-order",
        "0:0,0:2,0:1,0:5",
        "/media/Heat (1995) [1080p].mkv",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();

    assert_eq!(args, expected);
}

#[test]
fn test_plan_is_deterministic() {
    let file = heat();
    let policy = policy(&["en", "de"], &["en"], false, true);
    let builder = PlanBuilder::default();

    let first = builder.build(&file, &policy).unwrap();
    let second = builder.build(&file, &policy).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_misaligned_file_is_remuxed_in_declaration_order() {
    let file = load("misaligned.json", "/media/Ronin (1998) [1080p].mkv");
    assert!(AlignmentChecker::is_misaligned(
        &file.stream_orders(TrackKind::Video),
        &file.stream_orders(TrackKind::Audio),
        &file.stream_orders(TrackKind::Subtitle),
    ));

    let plan = remux(
        PlanBuilder::default()
            .build(&file, &policy(&["en"], &["en"], false, false))
            .unwrap(),
    );

    assert!(plan.removed.is_empty());
    assert!(plan.extractions.is_empty());
    assert_eq!(plan.track_order, vec![0, 2, 1]);

    let misalignment = plan.misalignment.unwrap();
    assert_eq!(misalignment.earlier, TrackKind::Audio);
    assert_eq!(misalignment.earlier_order, 2);
    assert_eq!(misalignment.later, TrackKind::Subtitle);
    assert_eq!(misalignment.later_order, 1);
}

#[test]
fn test_clean_file_needs_no_edits() {
    let file = load("clean.json", "/media/Clean (2002) [720p].mkv");
    let plan = cleanup(
        PlanBuilder::default()
            .build(&file, &policy(&["en"], &["en"], false, false))
            .unwrap(),
    );

    assert!(plan.is_empty());
    assert_eq!(plan.edit_count(), 0);
}

#[test]
fn test_cleanup_fixes_metadata_in_place() {
    let file = load("cleanup.json", "/media/Alien (1979) [Bluray-1080p].mkv");
    let plan = cleanup(
        PlanBuilder::default()
            .build(&file, &policy(&["en"], &["en"], false, false))
            .unwrap(),
    );

    assert_eq!(
        plan.track_edits,
        vec![
            TrackEdit::DeleteName { track_id: 1 },
            TrackEdit::SetLanguage {
                track_id: 1,
                language: "und".to_string()
            },
            TrackEdit::SetName {
                track_id: 2,
                name: "Dolby Digital Plus".to_string()
            },
            TrackEdit::SetName {
                track_id: 3,
                name: "English (Forced)".to_string()
            },
        ]
    );
    assert_eq!(plan.title.as_deref(), Some("Alien (1979)"));
    assert_eq!(plan.attachment_deletions, vec!["cover.jpg", "DejaVuSans.ttf"]);
    assert!(plan.delete_chapters);
    assert!(plan.delete_statistics_tags);

    let args = plan.to_propedit_args();
    assert_eq!(args[0], "/media/Alien (1979) [Bluray-1080p].mkv");
    assert!(args.windows(2).any(|w| w == ["--delete-attachment", "name:DejaVuSans.ttf"]));
    assert!(args.windows(2).any(|w| w == ["--chapters", ""]));
    assert_eq!(args.last().map(String::as_str), Some("--delete-track-statistics-tags"));
}

#[test]
fn test_edited_marker() {
    let source = Path::new("/media/Heat (1995) [1080p].mkv");
    let edited = edited_path(source);

    assert_eq!(edited, PathBuf::from("/media/Heat (1995) [1080p][edited].mkv"));
    assert!(!is_edited(source));
    assert!(is_edited(&edited));
}

#[test]
fn test_bracketed_name_keeps_whole_stem_as_title() {
    let file = load("clean.json", "/media/[Group] Clean (2002).mkv");
    let plan = cleanup(
        PlanBuilder::default()
            .build(&file, &policy(&["en"], &["en"], false, false))
            .unwrap(),
    );

    assert_eq!(plan.title.as_deref(), Some("[Group] Clean (2002)"));
    assert_eq!(plan.edit_count(), 1);
}
