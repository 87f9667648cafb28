//! Query expansion for keyword-only search.
//!
//! A conversational query such as "what did we decide about the deploy script" carries only a
//! couple of useful terms. Expansion keeps those terms, splits scripts without word boundaries
//! into searchable windows, and drops stop words from every supported language at once.

use std::{collections::HashSet, sync::LazyLock};

use unicode_normalization::UnicodeNormalization;
use unicode_script::{Script, UnicodeScript};

use crate::cjk::{self, CharClass};

const MIN_SPACED_TOKEN_CHARS: usize = 3;

const STOP_WORDS_EN: &[&str] = &[
	"a", "about", "above", "after", "again", "against", "ago", "all", "also", "an", "and", "any",
	"anything", "are", "as", "at", "be", "because", "been", "before", "being", "below",
	"between", "both", "but", "by", "can", "could", "did", "discussed", "do", "does", "doing",
	"down", "during", "each", "earlier", "else", "ever", "every", "everything", "few", "find",
	"for", "from", "further", "get", "give", "had", "has", "have", "having", "he", "help", "her",
	"here", "hers", "him", "his", "how", "i", "if", "in", "into", "is", "it", "its", "just",
	"know", "last", "later", "let", "me", "mentioned", "might", "more", "most", "must", "my",
	"no", "nor", "not", "nothing", "now", "of", "off", "on", "once", "only", "or", "other",
	"our", "ours", "out", "over", "own", "please", "recall", "recently", "remember", "said",
	"same", "say", "shall", "she", "should", "show", "so", "some", "something", "such", "talked",
	"tell", "than", "that", "the", "their", "theirs", "them", "then", "there", "these", "they",
	"thing", "things", "this", "those", "through", "to", "today", "tomorrow", "too", "under",
	"until", "up", "very", "was", "we", "were", "what", "when", "where", "which", "while",
	"who", "whom", "why", "will", "with", "would", "yesterday", "you", "your", "yours",
];
const STOP_WORDS_ES: &[&str] = &[
	"al", "ayer", "antes", "como", "con", "cuando", "cuál", "de", "del", "después", "donde",
	"dijimos", "el", "en", "era", "es", "esa", "ese", "eso", "esta", "estas", "este", "estos",
	"fue", "hablamos", "hoy", "la", "las", "le", "les", "lo", "los", "mañana", "mis", "muy",
	"más", "o", "para", "pero", "por", "qué", "que", "quién", "recordar", "se", "sin", "sobre",
	"son", "su", "sus", "tu", "un", "una", "unas", "unos", "y", "ya",
];
const STOP_WORDS_PT: &[&str] = &[
	"amanhã", "antes", "as", "com", "como", "da", "das", "depois", "do", "dos", "e", "em",
	"essa", "esse", "esta", "este", "foi", "falamos", "hoje", "isso", "isto", "já", "lembrar",
	"mais", "mas", "meu", "minha", "muito", "na", "nas", "no", "nos", "o", "onde", "ontem",
	"os", "ou", "para", "por", "qual", "quando", "que", "quem", "sem", "seu", "sobre", "sua",
	"são", "um", "uma", "umas", "uns", "é",
];
const STOP_WORDS_AR: &[&str] = &[
	"أمس", "أنا", "أنت", "أو", "أين", "إلى", "التي", "الذي", "الذين", "اليوم", "بعض", "تلك",
	"ثم", "ذلك", "على", "عن", "غدا", "في", "قد", "كان", "كانت", "كل", "كيف", "لا", "لم", "لماذا",
	"لن", "ما", "ماذا", "متى", "مع", "من", "نحن", "هذا", "هذه", "هل", "هم", "هو", "هي", "و",
	"يكون",
];
const STOP_WORDS_ZH: &[&str] = &[
	"一个", "上", "下", "不", "与", "中", "为", "为什么", "之前", "之后", "也", "了", "今天", "从",
	"他", "他们", "他的", "以", "们", "你", "你们", "你的", "吗", "吧", "呢", "和", "哪", "哪里",
	"啊", "在",
	"她", "对", "就", "怎么", "我", "我们", "我的", "或", "把", "提到", "明天", "昨天", "是", "最近",
	"有", "没有", "给", "而", "着", "被", "让", "讨论", "记得", "说过", "谁", "还", "过", "这",
	"这个", "那", "那个", "都", "的", "于", "及", "它", "很", "什么", "到",
];
const STOP_WORDS_JA: &[&str] = &[
	"あの", "あれ", "ある", "いつ", "いる", "か", "が", "から", "こと", "この", "これ", "ここ",
	"さん", "した", "して", "する", "そこ", "その", "それ", "ため", "だれ", "で", "でした",
	"です", "と", "どう", "どこ", "なぜ", "なに", "に", "の", "は", "へ", "ました", "ます",
	"まで", "も", "もの", "や", "よう", "より", "を", "何", "今日", "前", "后", "後", "明日",
	"昨日", "最近", "誰",
];
const STOP_WORDS_KO: &[&str] = &[
	"가", "과", "관련", "그", "그거", "그것", "그러나", "그리고", "나", "너", "내", "내일", "누구",
	"는", "대한", "대해", "도", "로", "를", "만", "무엇", "뭐", "및", "어디", "어떻게", "어제",
	"언제", "없다", "에", "에서", "와", "왜", "우리", "으로", "은", "을", "의", "이", "이거",
	"이것", "있다", "저", "저거", "저것", "전에", "제", "최근", "또는", "오늘", "하다", "하지만",
	"합니다", "했다", "했어요",
];
// Longest first so "에서" wins over "에".
const KO_TRAILING_PARTICLES: &[&str] = &[
	"에게서", "에서", "에게", "으로", "한테", "까지", "부터", "처럼", "보다", "이랑", "하고", "은",
	"는", "이", "가", "을", "를", "의", "에", "로", "와", "과", "도", "만",
];

static STOP_WORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
	[
		STOP_WORDS_EN,
		STOP_WORDS_ES,
		STOP_WORDS_PT,
		STOP_WORDS_AR,
		STOP_WORDS_ZH,
		STOP_WORDS_JA,
		STOP_WORDS_KO,
	]
	.into_iter()
	.flatten()
	.copied()
	.collect()
});

/// Expands a raw query into distinct keyword tokens in first-seen order.
///
/// An empty result means the query carries no keyword signal; it is not an error.
pub fn extract_keywords(query: &str) -> Vec<String> {
	let mut keywords = Vec::new();
	let mut seen = HashSet::new();

	for token in tokenize(query) {
		if is_stop_word(&token) || !is_valid_keyword(&token) {
			continue;
		}
		if !seen.insert(token.clone()) {
			continue;
		}

		keywords.push(token);
	}

	keywords
}

pub fn is_stop_word(token: &str) -> bool {
	STOP_WORDS.contains(token)
}

pub fn is_valid_keyword(token: &str) -> bool {
	if token.is_empty() {
		return false;
	}
	if token.chars().all(char::is_numeric) {
		return false;
	}
	if !token.chars().any(char::is_alphanumeric) {
		return false;
	}
	if !cjk::contains_cjk(token) && token.chars().count() < MIN_SPACED_TOKEN_CHARS {
		return false;
	}

	true
}

fn tokenize(query: &str) -> Vec<String> {
	let normalized = query.nfkc().collect::<String>().to_lowercase();
	let mut tokens = Vec::new();

	for segment in normalized.split(|ch: char| !is_word_char(ch)).filter(|s| !s.is_empty()) {
		let has_kana = segment.chars().any(cjk::is_kana);
		let has_han = segment.chars().any(|ch| cjk::classify(ch) == CharClass::Han);
		let has_hangul = segment.chars().any(|ch| cjk::classify(ch) == CharClass::Hangul);

		if has_kana {
			push_japanese(segment, &mut tokens);
		} else if has_han {
			push_chinese(segment, &mut tokens);
		} else if has_hangul {
			push_korean(segment, &mut tokens);
		} else {
			tokens.push(segment.to_string());
		}
	}

	tokens
}

fn is_word_char(ch: char) -> bool {
	ch.is_alphanumeric() || ch == '_' || ch.script() == Script::Inherited
}

fn push_japanese(segment: &str, tokens: &mut Vec<String>) {
	for (class, run) in cjk::script_runs(segment) {
		match class {
			CharClass::Han => push_han_windows(run, tokens),
			CharClass::Hiragana =>
				if run.chars().count() >= 2 {
					tokens.push(run.to_string());
				},
			CharClass::Katakana | CharClass::Hangul | CharClass::Word =>
				tokens.push(run.to_string()),
		}
	}
}

fn push_chinese(segment: &str, tokens: &mut Vec<String>) {
	for (class, run) in cjk::script_runs(segment) {
		match class {
			CharClass::Han => {
				let chars = run.chars().collect::<Vec<_>>();

				tokens.extend(chars.iter().map(char::to_string));
				tokens.extend(chars.windows(2).map(|pair| pair.iter().collect::<String>()));
			},
			_ => tokens.push(run.to_string()),
		}
	}
}

// Japanese kanji compounds keep the whole run as well as its bigrams.
fn push_han_windows(run: &str, tokens: &mut Vec<String>) {
	let chars = run.chars().collect::<Vec<_>>();

	tokens.push(run.to_string());

	if chars.len() > 2 {
		tokens.extend(chars.windows(2).map(|pair| pair.iter().collect::<String>()));
	}
}

fn push_korean(segment: &str, tokens: &mut Vec<String>) {
	let stem = strip_korean_particle(segment);
	let stem_is_stop_word = stem.is_some_and(is_stop_word);

	if !is_stop_word(segment) && !stem_is_stop_word {
		tokens.push(segment.to_string());
	}

	if let Some(stem) = stem
		&& !stem_is_stop_word
		&& is_useful_korean_stem(stem)
	{
		tokens.push(stem.to_string());
	}
}

fn strip_korean_particle(token: &str) -> Option<&str> {
	let token_chars = token.chars().count();

	KO_TRAILING_PARTICLES.iter().find_map(|particle| {
		if token_chars > particle.chars().count() {
			token.strip_suffix(particle)
		} else {
			None
		}
	})
}

fn is_useful_korean_stem(stem: &str) -> bool {
	if stem.chars().any(|ch| cjk::classify(ch) == CharClass::Hangul) {
		return stem.chars().count() >= 2;
	}

	stem.chars().count() >= MIN_SPACED_TOKEN_CHARS
}
