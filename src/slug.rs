use rand::{distributions::Uniform, Rng};

/// Characters dropped from titles when building a URL slug.
const STRIPPED: &str = "'\"+!%/=(){}[]|~ˇ$ß\\.:;?@&#<>";

const SUFFIX_CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Length of the random suffix appended to list and task slugs.
pub const SUFFIX_LEN: usize = 8;

/// Lowercases, turns spaces into hyphens and drops punctuation; everything
/// else passes through untouched.
pub fn slugify(title: &str) -> String {
    title
        .chars()
        .filter(|c| !STRIPPED.contains(*c))
        .map(|c| if c == ' ' { '-' } else { c })
        .collect::<String>()
        .to_lowercase()
}

/// Random lowercase alphanumeric string of exactly `len` characters.
pub fn random_suffix(len: usize) -> String {
    let dist = Uniform::from(0..SUFFIX_CHARS.len());
    rand::thread_rng()
        .sample_iter(dist)
        .take(len)
        .map(|i| SUFFIX_CHARS[i] as char)
        .collect()
}

/// `slugify(title)-<random suffix>`
pub fn unique_slug(title: &str) -> String {
    format!("{}-{}", slugify(title), random_suffix(SUFFIX_LEN))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_lowercases_and_hyphenates() {
        assert_eq!(slugify("My List"), "my-list");
        assert_eq!(slugify("Buy Milk & Eggs!"), "buy-milk--eggs");
    }

    #[test]
    fn slugify_strips_punctuation_but_keeps_other_characters() {
        assert_eq!(slugify("a.b:c;d?e@f#g<h>i"), "abcdefghi");
        assert_eq!(slugify("(x)[y]{z}"), "xyz");
        assert_eq!(slugify("Ünïcode_-*"), "ünïcode_-*");
    }

    #[test]
    fn suffix_has_exact_length_and_charset() {
        let suffix = random_suffix(SUFFIX_LEN);
        assert_eq!(suffix.len(), SUFFIX_LEN);
        assert!(suffix.bytes().all(|b| SUFFIX_CHARS.contains(&b)));
    }

    #[test]
    fn same_title_gives_distinct_slugs() {
        let a = unique_slug("My List");
        let b = unique_slug("My List");
        assert!(a.starts_with("my-list-"));
        assert_ne!(a, b);
    }
}
