use mneme_domain::keywords;

#[test]
fn english_query_splits_into_words() {
	assert_eq!(keywords::extract_keywords("hello world"), vec!["hello", "world"]);
}

#[test]
fn stop_words_and_short_tokens_are_dropped() {
	let tokens = keywords::extract_keywords("What did we decide about the deploy script on v2?");

	assert_eq!(tokens, vec!["decide", "deploy", "script"]);
}

#[test]
fn stop_words_are_checked_across_languages() {
	let tokens = keywords::extract_keywords("cuando hablamos sobre kubernetes");

	assert_eq!(tokens, vec!["kubernetes"]);
}

#[test]
fn numeric_and_punctuation_tokens_are_dropped() {
	let tokens = keywords::extract_keywords("2024 ___ !!! release-notes");

	assert_eq!(tokens, vec!["release", "notes"]);
}

#[test]
fn duplicates_keep_first_seen_order() {
	let tokens = keywords::extract_keywords("Rust rust RUST cargo rust");

	assert_eq!(tokens, vec!["rust", "cargo"]);
}

#[test]
fn empty_and_stop_word_only_queries_yield_nothing() {
	assert!(keywords::extract_keywords("").is_empty());
	assert!(keywords::extract_keywords("   ").is_empty());
	assert!(keywords::extract_keywords("what is the").is_empty());
}

#[test]
fn chinese_emits_unigrams_and_bigrams() {
	let tokens = keywords::extract_keywords("数据库迁移");

	assert_eq!(tokens, vec!["数", "据", "库", "迁", "移", "数据", "据库", "库迁", "迁移"]);
}

#[test]
fn chinese_stop_words_are_removed() {
	let tokens = keywords::extract_keywords("我的 猫");

	assert_eq!(tokens, vec!["猫"]);
}

#[test]
fn japanese_keeps_katakana_and_kanji_runs() {
	let tokens = keywords::extract_keywords("データベースの設計");

	assert_eq!(tokens, vec!["データベース", "設計"]);
}

#[test]
fn korean_particles_are_stripped() {
	let tokens = keywords::extract_keywords("회의에서 배포를");

	assert_eq!(tokens, vec!["회의에서", "회의", "배포를", "배포"]);
}

#[test]
fn korean_stop_words_are_not_emitted() {
	assert!(keywords::extract_keywords("그리고 우리").is_empty());
}

#[test]
fn full_width_input_is_folded() {
	assert_eq!(keywords::extract_keywords("ＤＥＰＬＯＹ"), vec!["deploy"]);
}

#[test]
fn keyword_validity_rules() {
	assert!(keywords::is_valid_keyword("api"));
	assert!(keywords::is_valid_keyword("猫"));
	assert!(!keywords::is_valid_keyword("ab"));
	assert!(!keywords::is_valid_keyword("12345"));
	assert!(!keywords::is_valid_keyword("---"));
	assert!(!keywords::is_valid_keyword(""));
}
