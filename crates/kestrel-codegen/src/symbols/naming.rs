//! Output identifier policy

use serde::{Deserialize, Serialize};

use crate::ir::QualifiedName;

/// Prefix of synthesized identity bindings (`$ID0`, `$ID1`, …)
pub const BINDING_PREFIX: &str = "$ID";

/// Prefix of synthesized event handlers (`$EH0`, `$EH1`, …)
pub const HANDLER_PREFIX: &str = "$EH";

/// How qualified names become identifiers in emitted code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NameStyle {
    /// `pkg.sub.Name` is emitted as is
    #[default]
    Dotted,
    /// `pkg.sub.Name` becomes `pkg_sub_Name`
    Flattened,
}

/// Replace package separators with underscores
pub fn flatten(name: &QualifiedName) -> String {
    name.as_str().replace('.', "_")
}

/// Mangled name of a private member (`pkg_Owner_member`)
pub fn private_member_name(owner: &QualifiedName, member: &str) -> String {
    format!("{}_{}", flatten(owner), member)
}

/// Name of the n-th synthesized identity binding
pub fn binding_name(index: usize) -> String {
    format!("{}{}", BINDING_PREFIX, index)
}

/// Name of the n-th synthesized event handler
pub fn handler_name(index: usize) -> String {
    format!("{}{}", HANDLER_PREFIX, index)
}

/// Whether `name` has the shape of a synthesized identity binding
pub fn is_synthetic_binding(name: &str) -> bool {
    name.strip_prefix(BINDING_PREFIX)
        .is_some_and(|rest| !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()))
}

/// Whether `name` has the shape of a synthesized event handler
pub fn is_synthetic_handler(name: &str) -> bool {
    name.strip_prefix(HANDLER_PREFIX)
        .is_some_and(|rest| !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()))
}

/// Accessor getter name
pub fn getter_name(property: &str) -> String {
    format!("get_{}", property)
}

/// Accessor setter name
pub fn setter_name(property: &str) -> String {
    format!("set_{}", property)
}

/// Backing storage field of a declared accessor
pub fn storage_name(property: &str) -> String {
    format!("{}_", property)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthetic_name_shapes() {
        assert!(is_synthetic_handler("$EH0"));
        assert!(is_synthetic_handler("$EH12"));
        assert!(!is_synthetic_handler("$EH"));
        assert!(!is_synthetic_handler("$EHx"));
        assert!(!is_synthetic_handler("$ID0"));
        assert!(is_synthetic_binding("$ID3"));
    }

    #[test]
    fn test_private_member_name() {
        let owner = QualifiedName::new("mypackage.Event");
        assert_eq!(private_member_name(&owner, "count"), "mypackage_Event_count");
    }

    #[test]
    fn test_synthetic_binding_shape() {
        assert_eq!(binding_name(2), "$ID2");
        assert!(is_synthetic_binding("$ID2"));
        assert!(is_synthetic_binding("$ID10"));
        assert!(!is_synthetic_binding("$ID"));
        assert!(!is_synthetic_binding("$IDx"));
        assert!(!is_synthetic_binding("service"));
    }
}
