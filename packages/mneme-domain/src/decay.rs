use std::{path::Path, sync::LazyLock};

use regex::Regex;
use time::{Date, Month, OffsetDateTime};

use mneme_config::SearchTemporalDecay;

use crate::{chunk::FusedHit, ranking};

const SECONDS_PER_DAY: f64 = 86_400.0;

static PATH_DATE_RE: LazyLock<Option<Regex>> =
	LazyLock::new(|| Regex::new(r"(?:^|[^0-9])(\d{4})-(\d{2})-(\d{2})(?:[^0-9]|$)").ok());

/// Where a chunk's recency comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimestampEvidence {
	/// Always-current content. Never decayed.
	Evergreen,
	/// A calendar date embedded in the path.
	PathDate(OffsetDateTime),
	/// The origin's last-modified time.
	Modified(OffsetDateTime),
	/// Nothing to go on. The score is left untouched.
	Unknown,
}
impl TimestampEvidence {
	pub fn timestamp(self) -> Option<OffsetDateTime> {
		match self {
			Self::PathDate(ts) | Self::Modified(ts) => Some(ts),
			Self::Evergreen | Self::Unknown => None,
		}
	}
}

/// Decides which paths are exempt from decay.
pub trait EvergreenPolicy
where
	Self: Send + Sync,
{
	fn is_evergreen(&self, path: &str, has_path_date: bool) -> bool;
}

/// Evergreen by file name, or by being an undated file under one of the configured directories.
#[derive(Clone, Debug, Default)]
pub struct PathEvergreenPolicy {
	pub files: Vec<String>,
	pub dirs: Vec<String>,
}
impl PathEvergreenPolicy {
	pub fn from_config(cfg: &SearchTemporalDecay) -> Self {
		Self { files: cfg.evergreen_files.clone(), dirs: cfg.evergreen_dirs.clone() }
	}
}
impl EvergreenPolicy for PathEvergreenPolicy {
	fn is_evergreen(&self, path: &str, has_path_date: bool) -> bool {
		let normalized = path.replace('\\', "/");
		let normalized = normalized.trim_start_matches("./");
		let path = Path::new(normalized);
		let file_name = path.file_name().and_then(|name| name.to_str()).unwrap_or(normalized);

		if self.files.iter().any(|name| name == file_name) {
			return true;
		}
		if has_path_date {
			return false;
		}

		let Some(parent) = path.parent() else {
			return false;
		};

		self.dirs.iter().any(|dir| parent.starts_with(dir))
	}
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DecaySettings {
	pub half_life_days: f64,
}
impl DecaySettings {
	pub fn lambda(&self) -> f64 {
		decay_lambda(self.half_life_days)
	}
}

pub fn decay_lambda(half_life_days: f64) -> f64 {
	std::f64::consts::LN_2 / half_life_days
}

/// `exp(-lambda * age)`, with negative ages treated as zero.
pub fn decay_multiplier(age_days: f64, half_life_days: f64) -> f64 {
	let age = if age_days.is_finite() { age_days.max(0.0) } else { 0.0 };

	(-decay_lambda(half_life_days) * age).exp()
}

pub fn age_days(timestamp: OffsetDateTime, now: OffsetDateTime) -> f64 {
	((now - timestamp).as_seconds_f64() / SECONDS_PER_DAY).max(0.0)
}

/// Extracts a `YYYY-MM-DD` calendar date from a path, at UTC midnight.
pub fn date_from_path(path: &str) -> Option<OffsetDateTime> {
	let re = PATH_DATE_RE.as_ref()?;

	for caps in re.captures_iter(path) {
		let year = caps.get(1).and_then(|m| m.as_str().parse::<i32>().ok());
		let month = caps
			.get(2)
			.and_then(|m| m.as_str().parse::<u8>().ok())
			.and_then(|m| Month::try_from(m).ok());
		let day = caps.get(3).and_then(|m| m.as_str().parse::<u8>().ok());
		let (Some(year), Some(month), Some(day)) = (year, month, day) else {
			continue;
		};

		if let Ok(date) = Date::from_calendar_date(year, month, day) {
			return Some(date.midnight().assume_utc());
		}
	}

	None
}

/// Resolves a chunk's recency evidence. Evergreen wins over everything, and a path date is
/// never replaced by the modification time.
pub fn resolve_timestamp(
	path: &str,
	modified: Option<OffsetDateTime>,
	policy: &dyn EvergreenPolicy,
) -> TimestampEvidence {
	let path_date = date_from_path(path);

	if policy.is_evergreen(path, path_date.is_some()) {
		return TimestampEvidence::Evergreen;
	}
	if let Some(ts) = path_date {
		return TimestampEvidence::PathDate(ts);
	}

	match modified {
		Some(ts) => TimestampEvidence::Modified(ts),
		None => TimestampEvidence::Unknown,
	}
}

/// Scales a single score by its recency. Scores without a timestamp pass through unchanged.
pub fn decay_score(
	score: f64,
	evidence: TimestampEvidence,
	settings: DecaySettings,
	now: OffsetDateTime,
) -> f64 {
	match evidence.timestamp() {
		Some(ts) => score * decay_multiplier(age_days(ts, now), settings.half_life_days),
		None => score,
	}
}

/// Applies decay to every hit and re-sorts by the adjusted score.
pub fn apply_temporal_decay(
	hits: &mut [FusedHit],
	settings: DecaySettings,
	policy: &dyn EvergreenPolicy,
	now: OffsetDateTime,
) {
	for hit in hits.iter_mut() {
		let evidence = resolve_timestamp(&hit.chunk.path, hit.chunk.updated_at, policy);

		hit.score = decay_score(hit.score, evidence, settings, now);
	}

	hits.sort_by(|a, b| ranking::cmp_score_desc(a.score, b.score));
}
