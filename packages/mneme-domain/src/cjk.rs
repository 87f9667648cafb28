use unicode_script::{Script, UnicodeScript};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CharClass {
	Han,
	Hiragana,
	Katakana,
	Hangul,
	/// Letters, digits, and marks of every other script.
	Word,
}

pub fn classify(ch: char) -> CharClass {
	// The prolonged sound mark is `Common` but only ever extends kana.
	if ch == 'ー' {
		return CharClass::Katakana;
	}

	match ch.script() {
		Script::Han => CharClass::Han,
		Script::Hiragana => CharClass::Hiragana,
		Script::Katakana => CharClass::Katakana,
		Script::Hangul => CharClass::Hangul,
		_ => CharClass::Word,
	}
}

pub fn is_kana(ch: char) -> bool {
	matches!(classify(ch), CharClass::Hiragana | CharClass::Katakana)
}

/// Scripts that do not separate words with spaces, plus Hangul whose syllable blocks make short
/// tokens meaningful.
pub fn is_dense_script(ch: char) -> bool {
	!matches!(classify(ch), CharClass::Word)
}

pub fn contains_cjk(input: &str) -> bool {
	input.chars().any(is_dense_script)
}

/// Splits a segment into maximal runs of a single [`CharClass`].
pub fn script_runs(segment: &str) -> Vec<(CharClass, &str)> {
	let mut runs = Vec::new();
	let mut current: Option<(CharClass, usize)> = None;

	for (idx, ch) in segment.char_indices() {
		let class = classify(ch);

		match current {
			Some((active, _)) if active == class => {},
			Some((active, start)) => {
				runs.push((active, &segment[start..idx]));

				current = Some((class, idx));
			},
			None => current = Some((class, idx)),
		}
	}

	if let Some((active, start)) = current {
		runs.push((active, &segment[start..]));
	}

	runs
}
