//! Admin lookup tables managed through [`EntityManager`](crate::entity_manager::EntityManager).

use indoc::indoc;
use serde_json::json;

use crate::effects::stan_core::StanCoreOperation;
use crate::entity_manager::ManagedEntity;

#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct DestructionReason {
    pub text: String,
    pub enabled: bool,
}

impl ManagedEntity for DestructionReason {
    const ENTITY_NAME: &'static str = "Destruction reason";

    fn value(&self) -> &str {
        &self.text
    }

    fn enabled(&self) -> bool {
        self.enabled
    }

    fn list() -> StanCoreOperation {
        StanCoreOperation::new(
            "GetDestructionReasons",
            indoc! {"
                query GetDestructionReasons($includeDisabled: Boolean) {
                    destructionReasons(includeDisabled: $includeDisabled) { text enabled }
                }
            "},
            "destructionReasons",
            json!({ "includeDisabled": true }),
        )
    }

    fn create(value: &str, _extra_property: Option<&str>) -> StanCoreOperation {
        StanCoreOperation::new(
            "AddDestructionReason",
            indoc! {"
                mutation AddDestructionReason($text: String!) {
                    addDestructionReason(text: $text) { text enabled }
                }
            "},
            "addDestructionReason",
            json!({ "text": value }),
        )
    }

    fn set_enabled(&self, enabled: bool) -> StanCoreOperation {
        StanCoreOperation::new(
            "SetDestructionReasonEnabled",
            indoc! {"
                mutation SetDestructionReasonEnabled($text: String!, $enabled: Boolean!) {
                    setDestructionReasonEnabled(text: $text, enabled: $enabled) { text enabled }
                }
            "},
            "setDestructionReasonEnabled",
            json!({ "text": self.text, "enabled": enabled }),
        )
    }
}

#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Species {
    pub name: String,
    pub enabled: bool,
}

impl ManagedEntity for Species {
    const ENTITY_NAME: &'static str = "Species";

    fn value(&self) -> &str {
        &self.name
    }

    fn enabled(&self) -> bool {
        self.enabled
    }

    fn list() -> StanCoreOperation {
        StanCoreOperation::new(
            "GetSpecies",
            indoc! {"
                query GetSpecies($includeDisabled: Boolean) {
                    species(includeDisabled: $includeDisabled) { name enabled }
                }
            "},
            "species",
            json!({ "includeDisabled": true }),
        )
    }

    fn create(value: &str, _extra_property: Option<&str>) -> StanCoreOperation {
        StanCoreOperation::new(
            "AddSpecies",
            indoc! {"
                mutation AddSpecies($name: String!) {
                    addSpecies(name: $name) { name enabled }
                }
            "},
            "addSpecies",
            json!({ "name": value }),
        )
    }

    fn set_enabled(&self, enabled: bool) -> StanCoreOperation {
        StanCoreOperation::new(
            "SetSpeciesEnabled",
            indoc! {"
                mutation SetSpeciesEnabled($name: String!, $enabled: Boolean!) {
                    setSpeciesEnabled(name: $name, enabled: $enabled) { name enabled }
                }
            "},
            "setSpeciesEnabled",
            json!({ "name": self.name, "enabled": enabled }),
        )
    }
}

#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ReleaseDestination {
    pub name: String,
    pub enabled: bool,
}

impl ManagedEntity for ReleaseDestination {
    const ENTITY_NAME: &'static str = "Release destination";

    fn value(&self) -> &str {
        &self.name
    }

    fn enabled(&self) -> bool {
        self.enabled
    }

    fn list() -> StanCoreOperation {
        StanCoreOperation::new(
            "GetReleaseDestinations",
            indoc! {"
                query GetReleaseDestinations($includeDisabled: Boolean) {
                    releaseDestinations(includeDisabled: $includeDisabled) { name enabled }
                }
            "},
            "releaseDestinations",
            json!({ "includeDisabled": true }),
        )
    }

    fn create(value: &str, _extra_property: Option<&str>) -> StanCoreOperation {
        StanCoreOperation::new(
            "AddReleaseDestination",
            indoc! {"
                mutation AddReleaseDestination($name: String!) {
                    addReleaseDestination(name: $name) { name enabled }
                }
            "},
            "addReleaseDestination",
            json!({ "name": value }),
        )
    }

    fn set_enabled(&self, enabled: bool) -> StanCoreOperation {
        StanCoreOperation::new(
            "SetReleaseDestinationEnabled",
            indoc! {"
                mutation SetReleaseDestinationEnabled($name: String!, $enabled: Boolean!) {
                    setReleaseDestinationEnabled(name: $name, enabled: $enabled) { name enabled }
                }
            "},
            "setReleaseDestinationEnabled",
            json!({ "name": self.name, "enabled": enabled }),
        )
    }
}

/// Comments are grouped by category, the same text may appear in several categories.
#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Comment {
    pub id: i64,
    pub text: String,
    pub category: String,
    pub enabled: bool,
}

impl ManagedEntity for Comment {
    const ENTITY_NAME: &'static str = "Comment";
    const EXTRA_PROPERTY: Option<&'static str> = Some("category");

    fn key(&self) -> String {
        self.id.to_string()
    }

    fn value(&self) -> &str {
        &self.text
    }

    fn enabled(&self) -> bool {
        self.enabled
    }

    fn extra_property(&self) -> Option<&str> {
        Some(&self.category)
    }

    fn list() -> StanCoreOperation {
        StanCoreOperation::new(
            "GetComments",
            indoc! {"
                query GetComments($includeDisabled: Boolean) {
                    comments(includeDisabled: $includeDisabled) { id text category enabled }
                }
            "},
            "comments",
            json!({ "includeDisabled": true }),
        )
    }

    fn create(value: &str, extra_property: Option<&str>) -> StanCoreOperation {
        StanCoreOperation::new(
            "AddComment",
            indoc! {"
                mutation AddComment($category: String!, $text: String!) {
                    addComment(category: $category, text: $text) { id text category enabled }
                }
            "},
            "addComment",
            json!({ "category": extra_property, "text": value }),
        )
    }

    fn set_enabled(&self, enabled: bool) -> StanCoreOperation {
        StanCoreOperation::new(
            "SetCommentEnabled",
            indoc! {"
                mutation SetCommentEnabled($commentId: Int!, $enabled: Boolean!) {
                    setCommentEnabled(commentId: $commentId, enabled: $enabled) { id text category enabled }
                }
            "},
            "setCommentEnabled",
            json!({ "commentId": self.id, "enabled": enabled }),
        )
    }

    fn set_extra_property(&self, value: &str) -> Option<StanCoreOperation> {
        Some(StanCoreOperation::new(
            "SetCommentCategory",
            indoc! {"
                mutation SetCommentCategory($commentId: Int!, $category: String!) {
                    setCommentCategory(commentId: $commentId, category: $category) { id text category enabled }
                }
            "},
            "setCommentCategory",
            json!({ "commentId": self.id, "category": value }),
        ))
    }
}

#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Equipment {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub enabled: bool,
}

impl ManagedEntity for Equipment {
    const ENTITY_NAME: &'static str = "Equipment";
    const EXTRA_PROPERTY: Option<&'static str> = Some("category");

    fn key(&self) -> String {
        self.id.to_string()
    }

    fn value(&self) -> &str {
        &self.name
    }

    fn enabled(&self) -> bool {
        self.enabled
    }

    fn extra_property(&self) -> Option<&str> {
        Some(&self.category)
    }

    fn list() -> StanCoreOperation {
        StanCoreOperation::new(
            "GetEquipments",
            indoc! {"
                query GetEquipments($includeDisabled: Boolean) {
                    equipments(includeDisabled: $includeDisabled) { id name category enabled }
                }
            "},
            "equipments",
            json!({ "includeDisabled": true }),
        )
    }

    fn create(value: &str, extra_property: Option<&str>) -> StanCoreOperation {
        StanCoreOperation::new(
            "AddEquipment",
            indoc! {"
                mutation AddEquipment($category: String!, $name: String!) {
                    addEquipment(category: $category, name: $name) { id name category enabled }
                }
            "},
            "addEquipment",
            json!({ "category": extra_property, "name": value }),
        )
    }

    fn set_enabled(&self, enabled: bool) -> StanCoreOperation {
        StanCoreOperation::new(
            "SetEquipmentEnabled",
            indoc! {"
                mutation SetEquipmentEnabled($equipmentId: Int!, $enabled: Boolean!) {
                    setEquipmentEnabled(equipmentId: $equipmentId, enabled: $enabled) { id name category enabled }
                }
            "},
            "setEquipmentEnabled",
            json!({ "equipmentId": self.id, "enabled": enabled }),
        )
    }

    fn set_extra_property(&self, value: &str) -> Option<StanCoreOperation> {
        Some(StanCoreOperation::new(
            "SetEquipmentCategory",
            indoc! {"
                mutation SetEquipmentCategory($equipmentId: Int!, $category: String!) {
                    setEquipmentCategory(equipmentId: $equipmentId, category: $category) { id name category enabled }
                }
            "},
            "setEquipmentCategory",
            json!({ "equipmentId": self.id, "category": value }),
        ))
    }
}

#[cfg(test)]
mod entities_tests {
    use super::*;

    #[test]
    fn comment_operations_use_id() {
        let comment = Comment {
            id: 7,
            text: "Poor section".to_string(),
            category: "section".to_string(),
            enabled: true,
        };

        let operation = comment.set_enabled(false);
        assert_eq!(operation.variables, json!({ "commentId": 7, "enabled": false }));
        assert_eq!(operation.root_field, "setCommentEnabled");

        let operation = comment
            .set_extra_property("Stain QC")
            .unwrap();
        assert_eq!(operation.variables, json!({ "commentId": 7, "category": "Stain QC" }));
    }

    #[test]
    fn species_has_no_extra_property() {
        let species = Species {
            name: "Human".to_string(),
            enabled: true,
        };

        assert_eq!(species.extra_property(), None);
        assert!(species
            .set_extra_property("anything")
            .is_none());
        assert_eq!(Species::list().variables, json!({ "includeDisabled": true }));
    }

    #[test]
    fn list_decodes_entities() {
        use crate::effects::stan_core::StanCoreResult;

        let result = StanCoreResult::Ok {
            data: json!({ "equipments": [{ "id": 1, "name": "Xenium 1", "category": "xenium", "enabled": true }] }),
        };

        let equipment: Vec<Equipment> = result
            .decode(&Equipment::list().root_field)
            .unwrap();

        assert_eq!(equipment[0].key(), "1");
        assert_eq!(equipment[0].value(), "Xenium 1");
        assert_eq!(equipment[0].extra_property(), Some("xenium"));
    }
}
