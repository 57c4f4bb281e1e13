/// Field-level update for a command; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandUpdate {
    pub template: Option<String>,
    pub permission_level: Option<i64>,
    pub items: Option<Vec<String>>,
}

impl CommandUpdate {
    pub fn template(template: impl Into<String>) -> Self {
        Self {
            template: Some(template.into()),
            ..Self::default()
        }
    }

    pub fn permission_level(level: i64) -> Self {
        Self {
            permission_level: Some(level),
            ..Self::default()
        }
    }

    pub fn items(items: Vec<String>) -> Self {
        Self {
            items: Some(items),
            ..Self::default()
        }
    }
}
