/// Pattern table: hiragana syllable → accepted key sequences.
///
/// The first pattern of each entry is the canonical spelling shown in the
/// typing guide. Validation accepts any entry. Hepburn comes first where
/// Hepburn and Kunrei differ (`shi` before `si`).
///
/// No pattern contains `q`; tests rely on it as a key that never matches.

/// Syllable that doubles the following consonant and has no sound of its own.
pub const GEMINATE_MARKER: &str = "っ";

/// Syllable-final nasal.
pub const MORAIC_NASAL: &str = "ん";

pub const NASAL_KEY: char = 'n';

pub const VOWELS: [char; 5] = ['a', 'i', 'u', 'e', 'o'];

/// First keys of a following syllable that force `ん` to be typed `nn`.
pub const AMBIGUOUS_AFTER_NASAL: [char; 7] = ['a', 'i', 'u', 'e', 'o', 'n', 'y'];

const KANA_TABLE: &[(&str, &[&str])] = &[
    // vowels
    ("あ", &["a"]),
    ("い", &["i", "yi"]),
    ("う", &["u", "wu"]),
    ("え", &["e"]),
    ("お", &["o"]),
    // k
    ("か", &["ka", "ca"]),
    ("き", &["ki"]),
    ("く", &["ku", "cu"]),
    ("け", &["ke"]),
    ("こ", &["ko", "co"]),
    // s
    ("さ", &["sa"]),
    ("し", &["shi", "si", "ci"]),
    ("す", &["su"]),
    ("せ", &["se", "ce"]),
    ("そ", &["so"]),
    // t
    ("た", &["ta"]),
    ("ち", &["chi", "ti"]),
    ("つ", &["tsu", "tu"]),
    ("て", &["te"]),
    ("と", &["to"]),
    // n
    ("な", &["na"]),
    ("に", &["ni"]),
    ("ぬ", &["nu"]),
    ("ね", &["ne"]),
    ("の", &["no"]),
    // h
    ("は", &["ha"]),
    ("ひ", &["hi"]),
    ("ふ", &["fu", "hu"]),
    ("へ", &["he"]),
    ("ほ", &["ho"]),
    // m
    ("ま", &["ma"]),
    ("み", &["mi"]),
    ("む", &["mu"]),
    ("め", &["me"]),
    ("も", &["mo"]),
    // y
    ("や", &["ya"]),
    ("ゆ", &["yu"]),
    ("よ", &["yo"]),
    // r
    ("ら", &["ra"]),
    ("り", &["ri"]),
    ("る", &["ru"]),
    ("れ", &["re"]),
    ("ろ", &["ro"]),
    // w
    ("わ", &["wa"]),
    ("を", &["wo"]),
    ("ん", &["nn", "xn", "n'"]),
    // voiced
    ("が", &["ga"]),
    ("ぎ", &["gi"]),
    ("ぐ", &["gu"]),
    ("げ", &["ge"]),
    ("ご", &["go"]),
    ("ざ", &["za"]),
    ("じ", &["ji", "zi"]),
    ("ず", &["zu"]),
    ("ぜ", &["ze"]),
    ("ぞ", &["zo"]),
    ("だ", &["da"]),
    ("ぢ", &["di"]),
    ("づ", &["du"]),
    ("で", &["de"]),
    ("ど", &["do"]),
    ("ば", &["ba"]),
    ("び", &["bi"]),
    ("ぶ", &["bu"]),
    ("べ", &["be"]),
    ("ぼ", &["bo"]),
    ("ぱ", &["pa"]),
    ("ぴ", &["pi"]),
    ("ぷ", &["pu"]),
    ("ぺ", &["pe"]),
    ("ぽ", &["po"]),
    ("ゔ", &["vu"]),
    // small kana, typed on their own
    ("ぁ", &["xa", "la"]),
    ("ぃ", &["xi", "li"]),
    ("ぅ", &["xu", "lu"]),
    ("ぇ", &["xe", "le"]),
    ("ぉ", &["xo", "lo"]),
    ("ゃ", &["xya", "lya"]),
    ("ゅ", &["xyu", "lyu"]),
    ("ょ", &["xyo", "lyo"]),
    ("ゎ", &["xwa", "lwa"]),
    ("っ", &["xtu", "ltu", "xtsu", "ltsu"]),
    // punctuation
    ("ー", &["-"]),
    ("、", &[","]),
    ("。", &["."]),
];

/// Accepted key sequences for one syllable. Empty if unknown.
pub fn patterns_for(syllable: &str) -> Vec<Vec<char>> {
    KANA_TABLE
        .iter()
        .find(|(kana, _)| *kana == syllable)
        .map(|(_, pats)| pats.iter().map(|p| p.chars().collect()).collect())
        .unwrap_or_default()
}

/// Split a kana string into syllables. Combining voicing marks
/// (U+3099, U+309A) stay attached to the character before them.
pub fn split_syllables(text: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for ch in text.chars() {
        let combining = matches!(ch, '\u{3099}' | '\u{309A}');
        match out.last_mut() {
            Some(last) if combining => last.push(ch),
            _ => out.push(ch.to_string()),
        }
    }
    // Fold decomposed voiced kana to their precomposed form so the table hits.
    out.into_iter().map(|s| compose_voiced(&s)).collect()
}

fn compose_voiced(s: &str) -> String {
    let mut chars = s.chars();
    let (Some(base), Some(mark), None) = (chars.next(), chars.next(), chars.next()) else {
        return s.to_string();
    };
    let offset = match mark {
        '\u{3099}' => 1,
        '\u{309A}' => 2,
        _ => return s.to_string(),
    };
    let composed = char::from_u32(base as u32 + offset).map(|c| c.to_string());
    match composed {
        Some(c) if !patterns_for(&c).is_empty() => c,
        _ => s.to_string(),
    }
}

/// Canonical spelling of each syllable, for the typing guide.
///
/// `ん` is shown as a single `n` where the matcher accepts that, and as
/// `nn` where the next syllable would make a lone `n` ambiguous. Unknown
/// syllables contribute an empty string.
pub fn default_keys_per_syllable(syllables: &[String]) -> Vec<String> {
    syllables
        .iter()
        .enumerate()
        .map(|(i, syl)| {
            let pats = patterns_for(syl);
            if syl == MORAIC_NASAL {
                let next = syllables.get(i + 1).map(|s| patterns_for(s)).unwrap_or_default();
                if !starts_ambiguous_after_nasal(&next) {
                    return NASAL_KEY.to_string();
                }
            }
            pats.first().map(|p| p.iter().collect()).unwrap_or_default()
        })
        .collect()
}

/// Canonical spelling of a whole kana string.
pub fn default_keys(text: &str) -> String {
    default_keys_per_syllable(&split_syllables(text)).concat()
}

/// True if any of `patterns` starts with a vowel, `y` or `n`.
pub fn starts_ambiguous_after_nasal(patterns: &[Vec<char>]) -> bool {
    patterns
        .iter()
        .any(|p| p.first().is_some_and(|c| AMBIGUOUS_AFTER_NASAL.contains(c)))
}
