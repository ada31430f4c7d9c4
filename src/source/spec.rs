//! Registration entries
//!
//! Each command-line entry is a path, a comma-separated list of paths, or
//! either of those prefixed with `name:`. Paths sharing a name form one
//! multi-file source; unnamed paths each form their own.

use std::path::PathBuf;

/// One source to register: an optional display name and its file set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSpec {
    pub name: Option<String>,
    pub paths: Vec<PathBuf>,
}

impl SourceSpec {
    pub fn single(path: impl Into<PathBuf>) -> Self {
        Self {
            name: None,
            paths: vec![path.into()],
        }
    }
}

/// Split a `name:path` item. Single-letter prefixes are drive letters.
fn split_name(item: &str) -> (Option<&str>, &str) {
    match item.split_once(':') {
        Some((name, path))
            if name.len() > 1
                && !path.is_empty()
                && !name.contains(['/', '\\', '.']) =>
        {
            (Some(name), path)
        }
        _ => (None, item),
    }
}

/// Group entries into source specs, in order of first appearance.
pub fn parse_entries<I, S>(entries: I) -> Vec<SourceSpec>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut specs: Vec<SourceSpec> = Vec::new();
    for entry in entries {
        for item in entry.as_ref().split(',') {
            let item = item.trim();
            if item.is_empty() {
                continue;
            }
            match split_name(item) {
                (Some(name), path) => {
                    match specs
                        .iter_mut()
                        .find(|s| s.name.as_deref() == Some(name))
                    {
                        Some(spec) => spec.paths.push(PathBuf::from(path)),
                        None => specs.push(SourceSpec {
                            name: Some(name.to_string()),
                            paths: vec![PathBuf::from(path)],
                        }),
                    }
                }
                (None, path) => specs.push(SourceSpec::single(path)),
            }
        }
    }
    specs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_entries_are_grouped() {
        let specs = parse_entries(["calo:a.npz,calo:b.npz"]);
        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].name.as_deref(), Some("calo"));
        assert_eq!(
            specs[0].paths,
            vec![PathBuf::from("a.npz"), PathBuf::from("b.npz")]
        );
    }

    #[test]
    fn test_grouping_spans_entries() {
        let specs = parse_entries(["x:1.npz", "plain.npz", "x:2.npz"]);
        assert_eq!(specs.len(), 2);
        assert_eq!(specs[0].paths.len(), 2);
        assert_eq!(specs[1], SourceSpec::single("plain.npz"));
    }

    #[test]
    fn test_unnamed_paths_stay_separate() {
        let specs = parse_entries(["a.npz, b.npz"]);
        assert_eq!(specs.len(), 2);
        assert!(specs.iter().all(|s| s.name.is_none()));
    }

    #[test]
    fn test_drive_letters_and_paths_are_not_names() {
        assert_eq!(split_name(r"C:\data\a.npz"), (None, r"C:\data\a.npz"));
        assert_eq!(split_name("./dir:x/a.npz"), (None, "./dir:x/a.npz"));
        assert_eq!(split_name("tpc:/data/a.npz"), (Some("tpc"), "/data/a.npz"));
    }

    #[test]
    fn test_empty_items_skipped() {
        assert!(parse_entries([",, ,"]).is_empty());
    }
}
