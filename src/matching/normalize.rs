//! Query canonicalization.

/// Normalize a raw query for matching: trim, lowercase, replace ASCII
/// single/double quotes with spaces (so `'name'` surfaces `name`), collapse
/// whitespace runs. Hyphens, digits, and other punctuation are preserved so
/// identifiers like `aws-ecs-deployment` survive intact.
///
/// A whitespace-only query normalizes to the empty string, which the router
/// treats as no match.
pub fn normalize(query: &str) -> String {
    let lowered = query.to_lowercase();
    let dequoted: String = lowered
        .chars()
        .map(|c| if c == '\'' || c == '"' { ' ' } else { c })
        .collect();
    dequoted.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercase_and_trim() {
        assert_eq!(normalize("  Use Terraform-Base  "), "use terraform-base");
    }

    #[test]
    fn test_quotes_become_spaces() {
        assert_eq!(normalize("use 'terraform-base'"), "use terraform-base");
        assert_eq!(normalize("apply \"ecr-setup\" now"), "apply ecr-setup now");
    }

    #[test]
    fn test_whitespace_collapses() {
        assert_eq!(normalize("build   a\tstatic\n website"), "build a static website");
    }

    #[test]
    fn test_identifiers_survive() {
        assert_eq!(normalize("aws-ecs-deployment v2!"), "aws-ecs-deployment v2!");
    }

    #[test]
    fn test_empty_and_blank() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   \t\n "), "");
        assert_eq!(normalize("'\"'"), "");
    }

    #[test]
    fn test_idempotent() {
        for query in ["  Use 'X'  ", "plain words", "a-b  c", ""] {
            let once = normalize(query);
            assert_eq!(normalize(&once), once);
        }
    }
}
