/// Prefixes stripped from prompt labels before table lookups.
pub fn default_prefixes() -> Vec<String> {
    [
        "a photo of ",
        "a ",
        "an ",
        "tree showing example of ",
        "bush showing example of ",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Reduces a prompt label to its lookup key.
///
/// Lowercases, drops every `.`, trims, then strips any of `prefixes` from the
/// front until none matches:
/// `"A photo of a tree showing example of dead branches."` → `"dead branches"`.
pub fn normalize_key(label: &str, prefixes: &[String]) -> String {
    let lowered = label.to_lowercase().replace('.', "");
    let mut rest = lowered.trim();
    loop {
        let stripped = prefixes
            .iter()
            .filter(|p| !p.is_empty())
            .find_map(|p| rest.strip_prefix(p.as_str()))
            .map(str::trim_start);
        match stripped {
            Some(next) if next.len() < rest.len() => rest = next,
            _ => break,
        }
    }
    rest.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> String {
        normalize_key(s, &default_prefixes())
    }

    #[test]
    fn strips_photo_article_and_example_prefixes() {
        assert_eq!(
            key("A photo of a tree showing example of the trunk rot"),
            "the trunk rot"
        );
        assert_eq!(key("A photo of a bush showing example of fungal growth"), "fungal growth");
        assert_eq!(key("A photo of an Ash (Fraxinus) tree."), "ash (fraxinus) tree");
        assert_eq!(
            key("A photo of a Dwarf Scots pine (Pinus sylvestris f. fruticosa) bush."),
            "dwarf scots pine (pinus sylvestris f fruticosa) bush"
        );
    }

    #[test]
    fn plain_labels_only_lowercase_and_trim() {
        assert_eq!(key("  Dead Branches "), "dead branches");
        assert_eq!(key("straight tree"), "straight tree");
    }

    #[test]
    fn words_starting_with_article_letters_survive() {
        assert_eq!(key("ash"), "ash");
        assert_eq!(key("another tree"), "another tree");
    }

    #[test]
    fn empty_prefix_list_keeps_prompt() {
        assert_eq!(normalize_key("A photo of a tree", &[]), "a photo of a tree");
    }

    #[test]
    fn empty_prefix_entry_is_ignored() {
        assert_eq!(normalize_key("a tree", &["".to_string(), "a ".to_string()]), "tree");
    }
}
