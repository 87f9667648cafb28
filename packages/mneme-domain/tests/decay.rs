mod support;

use time::{Duration, OffsetDateTime, macros::datetime};

use mneme_domain::decay::{self, DecaySettings, PathEvergreenPolicy, TimestampEvidence};

const NOW: OffsetDateTime = datetime!(2025-03-01 00:00 UTC);

fn policy() -> PathEvergreenPolicy {
	PathEvergreenPolicy {
		files: vec!["MEMORY.md".to_string(), "memory.md".to_string()],
		dirs: vec!["memory".to_string()],
	}
}

#[test]
fn decay_at_half_life_halves_the_score() {
	assert!((decay::decay_multiplier(30.0, 30.0) - 0.5).abs() < 1e-12);

	let settings = DecaySettings { half_life_days: 30.0 };
	let evidence = TimestampEvidence::Modified(NOW - Duration::days(30));
	let decayed = decay::decay_score(0.8, evidence, settings, NOW);

	assert!((decayed - 0.4).abs() < 1e-9);
}

#[test]
fn lambda_is_ln2_over_half_life() {
	assert!((decay::decay_lambda(30.0) - std::f64::consts::LN_2 / 30.0).abs() < 1e-15);
	let settings = DecaySettings { half_life_days: 7.0 };

	assert!((settings.lambda() - decay::decay_lambda(7.0)).abs() < 1e-15);
}

#[test]
fn future_timestamps_do_not_boost() {
	assert_eq!(decay::decay_multiplier(-5.0, 30.0), 1.0);
	assert_eq!(decay::age_days(NOW + Duration::days(2), NOW), 0.0);
}

#[test]
fn dates_are_read_from_paths() {
	assert_eq!(
		decay::date_from_path("memory/2025-01-31.md"),
		Some(datetime!(2025-01-31 00:00 UTC))
	);
	assert_eq!(
		decay::date_from_path("journal/2024-12-05/notes.md"),
		Some(datetime!(2024-12-05 00:00 UTC))
	);
	assert_eq!(decay::date_from_path("memory/2025-02-30.md"), None);
	assert_eq!(decay::date_from_path("memory/notes.md"), None);
	assert_eq!(decay::date_from_path("build/12025-01-01x.md"), None);
}

#[test]
fn path_date_wins_over_modified_time() {
	let evidence = decay::resolve_timestamp(
		"memory/2025-01-31.md",
		Some(NOW - Duration::days(1)),
		&policy(),
	);

	assert_eq!(evidence, TimestampEvidence::PathDate(datetime!(2025-01-31 00:00 UTC)));
}

#[test]
fn evergreen_files_are_never_decayed() {
	let modified = Some(NOW - Duration::days(400));

	assert_eq!(
		decay::resolve_timestamp("MEMORY.md", modified, &policy()),
		TimestampEvidence::Evergreen
	);
	assert_eq!(
		decay::resolve_timestamp("archive/2020-01-01/MEMORY.md", modified, &policy()),
		TimestampEvidence::Evergreen
	);
	assert_eq!(
		decay::resolve_timestamp("memory/projects.md", modified, &policy()),
		TimestampEvidence::Evergreen
	);
}

#[test]
fn dated_files_in_evergreen_dirs_still_decay() {
	let evidence = decay::resolve_timestamp("memory/2025-02-01.md", None, &policy());

	assert_eq!(evidence, TimestampEvidence::PathDate(datetime!(2025-02-01 00:00 UTC)));
}

#[test]
fn modified_time_is_used_when_path_has_no_date() {
	let modified = NOW - Duration::days(3);
	let evidence = decay::resolve_timestamp("notes/ideas.md", Some(modified), &policy());

	assert_eq!(evidence, TimestampEvidence::Modified(modified));
}

#[test]
fn unknown_timestamp_leaves_score_unchanged() {
	let settings = DecaySettings { half_life_days: 30.0 };
	let evidence = decay::resolve_timestamp("notes/ideas.md", None, &policy());

	assert_eq!(evidence, TimestampEvidence::Unknown);
	assert_eq!(decay::decay_score(0.8, evidence, settings, NOW), 0.8);
	assert_eq!(decay::decay_score(0.8, TimestampEvidence::Evergreen, settings, NOW), 0.8);
}

#[test]
fn custom_policies_can_be_plugged_in() {
	struct NothingIsEvergreen;
	impl decay::EvergreenPolicy for NothingIsEvergreen {
		fn is_evergreen(&self, _: &str, _: bool) -> bool {
			false
		}
	}

	let modified = NOW - Duration::days(10);
	let evidence = decay::resolve_timestamp("MEMORY.md", Some(modified), &NothingIsEvergreen);

	assert_eq!(evidence, TimestampEvidence::Modified(modified));
}

#[test]
fn apply_decay_reorders_by_adjusted_score() {
	let settings = DecaySettings { half_life_days: 30.0 };
	let mut hits = vec![
		support::fused_at("old", "notes/old.md", Some(NOW - Duration::days(60)), 0.9),
		support::fused_at("fresh", "notes/fresh.md", Some(NOW), 0.5),
		support::fused_at("pinned", "MEMORY.md", Some(NOW - Duration::days(900)), 0.4),
	];

	decay::apply_temporal_decay(&mut hits, settings, &policy(), NOW);

	assert_eq!(support::ids(&hits), vec!["fresh", "pinned", "old"]);
	assert!((hits[2].score - 0.225).abs() < 1e-9);
	assert_eq!(hits[1].score, 0.4);
}
