use crate::parser::{joined, parse_id, parse_sections, Section};

/// An SDK platform from `avdmanager list target`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub id: u32,
    pub id_alias: String,
    pub name: Option<String>,
    pub target_type: Option<String>,
    pub api_level: Option<u32>,
    pub revision: Option<u32>,
}

impl Target {
    pub(crate) fn parse_list(text: &str) -> Vec<Target> {
        parse_sections(text, TargetDraft::default)
    }
}

#[derive(Debug, Default)]
struct TargetDraft {
    id: Option<(u32, String)>,
    name: Option<String>,
    target_type: Option<String>,
    api_level: Option<u32>,
    revision: Option<u32>,
}

impl Section for TargetDraft {
    type Record = Target;
    const SEPARATOR: &'static str = "----------";

    fn field(&mut self, key: &str, segments: &[&str]) {
        let value = joined(segments);
        match key {
            "ID" => {
                if let Some(id) = parse_id(&value) {
                    self.id = Some(id);
                }
            }
            "NAME" => self.name = Some(value),
            "TYPE" => self.target_type = Some(value),
            "API LEVEL" => {
                if let Ok(level) = value.parse() {
                    self.api_level = Some(level);
                }
            }
            "REVISION" => {
                if let Ok(revision) = value.parse() {
                    self.revision = Some(revision);
                }
            }
            _ => {}
        }
    }

    fn finish(self) -> Option<Target> {
        let (id, id_alias) = self.id?;
        Some(Target {
            id,
            id_alias,
            name: self.name,
            target_type: self.target_type,
            api_level: self.api_level,
            revision: self.revision,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::target::Target;

    const LIST_TARGET: &str = "\
Available Android targets:
----------
id: 1 or \"android-30\"
     Name: Android API 30
     Type: Platform
     API level: 30
     Revision: 3
----------
id: 2 or \"android-33\"
     Name: Android API 33
     Type: Platform
     API level: 33
     Revision: 2
";

    #[test]
    fn parses_targets_in_order() {
        let targets = Target::parse_list(LIST_TARGET);

        assert_eq!(targets, vec![
            Target {
                id: 1,
                id_alias: "android-30".to_string(),
                name: Some("Android API 30".to_string()),
                target_type: Some("Platform".to_string()),
                api_level: Some(30),
                revision: Some(3),
            },
            Target {
                id: 2,
                id_alias: "android-33".to_string(),
                name: Some("Android API 33".to_string()),
                target_type: Some("Platform".to_string()),
                api_level: Some(33),
                revision: Some(2),
            },
        ]);
    }

    #[test]
    fn device_separator_does_not_split_targets() {
        let text = "id: 1 or \"android-30\"\n---------\nid: 2 or \"android-33\"\n";
        let targets = Target::parse_list(text);

        // nine dashes is not a target separator, so the second id wins
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].id, 2);
    }

    #[test]
    fn block_without_id_is_dropped() {
        let text = "----------\n     Name: Android API 30\n     API level: 30\n----------\n";

        assert!(Target::parse_list(text).is_empty());
    }

    #[test]
    fn unparsable_numbers_are_left_unset() {
        let text = "id: 5 or \"android-S\"\nAPI level: S\nRevision: 1\n";
        let targets = Target::parse_list(text);

        assert_eq!(targets[0].api_level, None);
        assert_eq!(targets[0].revision, Some(1));
    }

    #[test]
    fn text_without_records_is_empty() {
        assert!(Target::parse_list("Available Android targets:\n").is_empty());
        assert!(Target::parse_list("").is_empty());
    }
}
