//! Diacritic-insensitive search text
//!
//! [`normalize`] lower-cases and folds accented Latin letters to their base letter, so a
//! search for `jose` matches `José` without locale collation support in the database.
//! Stores that can register a SQL scalar function named [`NORMALIZE_FUNCTION`] apply the
//! same folding to column values.

/// Name of the SQL scalar function that applies [`normalize`] inside the database
pub const NORMALIZE_FUNCTION: &str = "normalize";

/// Escape character declared with `LIKE ... ESCAPE`
pub const LIKE_ESCAPE: char = '!';

/// Lower-case `text` and fold diacritics to base letters
///
/// Covers the a, c, d, e, i, l, n, o, r, s, t, u, y and z families plus the `æ` and `œ`
/// ligatures. Idempotent.
///
/// # Examples
///
/// ```
/// use collate_core::normalize;
///
/// assert_eq!(normalize("José Ñúñez"), "jose nunez");
/// assert_eq!(normalize("Œuvre"), "oeuvre");
/// assert_eq!(normalize("Č"), normalize("č"));
/// ```
pub fn normalize(text: &str) -> String {
	let mut out = String::with_capacity(text.len());
	for c in text.chars().flat_map(char::to_lowercase) {
		match c {
			'æ' => out.push_str("ae"),
			'œ' => out.push_str("oe"),
			_ => out.push(fold_char(c)),
		}
	}
	out
}

/// Base letter for a lower-case accented letter; other characters map to themselves
pub fn fold_char(c: char) -> char {
	match c {
		'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' | 'ǎ' | 'ǟ' | 'ǡ' | 'ǻ' | 'ȁ' | 'ȃ'
		| 'ȧ' | 'ạ' | 'ả' | 'ấ' | 'ầ' | 'ẩ' | 'ẫ' | 'ậ' | 'ắ' | 'ằ' | 'ẳ' | 'ẵ' | 'ặ' => 'a',
		'ç' | 'ć' | 'ĉ' | 'ċ' | 'č' => 'c',
		'ď' | 'đ' | 'ð' => 'd',
		'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ĕ' | 'ė' | 'ę' | 'ě' | 'ȅ' | 'ȇ' | 'ȩ' | 'ẹ' | 'ẻ' | 'ẽ'
		| 'ế' | 'ề' | 'ể' | 'ễ' | 'ệ' => 'e',
		'ì' | 'í' | 'î' | 'ï' | 'ĩ' | 'ī' | 'ĭ' | 'į' | 'ı' | 'ǐ' | 'ȉ' | 'ȋ' | 'ỉ' | 'ị' => 'i',
		'ĺ' | 'ļ' | 'ľ' | 'ŀ' | 'ł' => 'l',
		'ñ' | 'ń' | 'ņ' | 'ň' | 'ǹ' => 'n',
		'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' | 'ŏ' | 'ő' | 'ơ' | 'ǒ' | 'ǿ' | 'ȍ' | 'ȏ' | 'ȫ'
		| 'ȭ' | 'ȯ' | 'ȱ' | 'ọ' | 'ỏ' | 'ố' | 'ồ' | 'ổ' | 'ỗ' | 'ộ' | 'ớ' | 'ờ' | 'ở' | 'ỡ'
		| 'ợ' => 'o',
		'ŕ' | 'ŗ' | 'ř' | 'ȑ' | 'ȓ' => 'r',
		'ś' | 'ŝ' | 'ş' | 'š' | 'ș' => 's',
		'ţ' | 'ť' | 'ŧ' | 'ț' => 't',
		'ù' | 'ú' | 'û' | 'ü' | 'ũ' | 'ū' | 'ŭ' | 'ů' | 'ű' | 'ų' | 'ư' | 'ǔ' | 'ǖ' | 'ǘ' | 'ǚ'
		| 'ǜ' | 'ȕ' | 'ȗ' | 'ụ' | 'ủ' | 'ứ' | 'ừ' | 'ử' | 'ữ' | 'ự' => 'u',
		'ý' | 'ÿ' | 'ŷ' | 'ỳ' | 'ỵ' | 'ỷ' | 'ỹ' => 'y',
		'ź' | 'ż' | 'ž' => 'z',
		_ => c,
	}
}

/// Escape [`LIKE_ESCAPE`], `%` and `_` so `input` matches literally inside a
/// `LIKE ... ESCAPE '!'` pattern
pub fn escape_like(input: &str) -> String {
	let mut out = String::with_capacity(input.len());
	for c in input.chars() {
		if matches!(c, LIKE_ESCAPE | '%' | '_') {
			out.push(LIKE_ESCAPE);
		}
		out.push(c);
	}
	out
}

/// `%escaped%` substring pattern for `term`
pub fn contains_pattern(term: &str) -> String {
	format!("%{}%", escape_like(term))
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;
	use rstest::rstest;

	#[rstest]
	#[case("Č", "c")]
	#[case("č", "c")]
	#[case("ÀÉÎÕÜ", "aeiou")]
	#[case("Ça Đồng Łódź", "ca dong lodz")]
	#[case("Ŕíšťý Žďár", "risty zdar")]
	#[case("Æsir", "aesir")]
	#[case("Ørsted", "orsted")]
	#[case("plain ascii 123", "plain ascii 123")]
	#[case("日本語", "日本語")]
	#[case("", "")]
	fn folds_and_lowercases(#[case] input: &str, #[case] expected: &str) {
		// Act & Assert
		assert_eq!(normalize(input), expected);
	}

	#[rstest]
	fn case_insensitive() {
		// Act & Assert
		assert_eq!(normalize("JOSÉ"), normalize("josé"));
		assert_eq!(normalize("JOSÉ"), "jose");
	}

	#[rstest]
	#[case("50%", "50!%")]
	#[case("snake_case", "snake!_case")]
	#[case("wow!", "wow!!")]
	#[case("back\\slash", "back\\slash")]
	#[case("plain", "plain")]
	fn like_escaping(#[case] input: &str, #[case] expected: &str) {
		// Act & Assert
		assert_eq!(escape_like(input), expected);
	}

	#[rstest]
	fn contains_pattern_wraps_escaped_term() {
		// Act & Assert
		assert_eq!(contains_pattern("a_b"), "%a!_b%");
	}

	proptest! {
		#[test]
		fn prop_normalize_is_idempotent(text in "\\PC{0,40}") {
			let once = normalize(&text);
			prop_assert_eq!(normalize(&once), once);
		}

		#[test]
		fn prop_normalize_ignores_case(text in "[a-zA-ZàáâäçčéèêëíïñóöøšúüýžÀÁÂÄÇČÉÈÊËÍÏÑÓÖØŠÚÜÝŽ ]{0,30}") {
			prop_assert_eq!(normalize(&text.to_uppercase()), normalize(&text.to_lowercase()));
		}
	}
}
