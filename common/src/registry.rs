//! Member registry
//!
//! Built once per run through [`RegistryBuilder`] and read-only afterwards.

use crate::alias::{normalize_name, NameCorrections};
use crate::error::{Error, Result};
use crate::matcher::token_sort;
use crate::types::Member;
use std::collections::HashMap;

/// Ordered roster plus the correction table
#[derive(Debug, Clone, Default)]
pub struct MemberRegistry {
    members: Vec<Member>,
    /// Lowercased full names, parallel to `members`
    normalized_names: Vec<String>,
    /// Token-sorted names used by fuzzy scoring
    sort_keys: Vec<String>,
    by_id: HashMap<String, usize>,
    corrections: NameCorrections,
}

impl MemberRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn get(&self, member_id: &str) -> Option<&Member> {
        self.by_id.get(member_id).map(|&idx| &self.members[idx])
    }

    pub fn corrections(&self) -> &NameCorrections {
        &self.corrections
    }

    /// Members paired with their normalized full names, in roster order
    pub fn entries(&self) -> impl Iterator<Item = (&Member, &str)> {
        self.members
            .iter()
            .zip(self.normalized_names.iter().map(|s| s.as_str()))
    }

    pub(crate) fn sort_keys(&self) -> &[String] {
        &self.sort_keys
    }

    /// First member whose normalized full name equals `name` (after normalizing it)
    pub fn find_exact(&self, name: &str) -> Option<&Member> {
        let target = normalize_name(name);
        self.entries()
            .find(|(_, normalized)| *normalized == target)
            .map(|(member, _)| member)
    }
}

/// Single-writer builder for [`MemberRegistry`]
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    members: Vec<Member>,
    corrections: NameCorrections,
}

impl RegistryBuilder {
    pub fn member(mut self, member: Member) -> Self {
        self.members.push(member);
        self
    }

    pub fn members(mut self, members: impl IntoIterator<Item = Member>) -> Self {
        self.members.extend(members);
        self
    }

    pub fn corrections(mut self, corrections: NameCorrections) -> Self {
        self.corrections = corrections;
        self
    }

    /// Freeze the registry; member ids must be unique
    pub fn build(self) -> Result<MemberRegistry> {
        let mut by_id = HashMap::with_capacity(self.members.len());
        for (idx, member) in self.members.iter().enumerate() {
            if by_id.insert(member.member_id.clone(), idx).is_some() {
                return Err(Error::DuplicateMember(member.member_id.clone()));
            }
        }

        let normalized_names: Vec<String> = self
            .members
            .iter()
            .map(|m| normalize_name(&m.full_name()))
            .collect();
        let sort_keys = normalized_names.iter().map(|n| token_sort(n)).collect();

        Ok(MemberRegistry {
            members: self.members,
            normalized_names,
            sort_keys,
            by_id,
            corrections: self.corrections,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_and_lookup() {
        let registry = MemberRegistry::builder()
            .member(Member::new("M001", "John", "Doe"))
            .member(Member::new("M002", "Jane", "Smith"))
            .build()
            .unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get("M002").unwrap().full_name(), "Jane Smith");
        assert!(registry.get("M999").is_none());
        assert_eq!(registry.find_exact(" JOHN doe").unwrap().member_id, "M001");
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let result = MemberRegistry::builder()
            .member(Member::new("M001", "John", "Doe"))
            .member(Member::new("M001", "Johnny", "Doe"))
            .build();
        assert!(matches!(result, Err(Error::DuplicateMember(id)) if id == "M001"));
    }

    #[test]
    fn test_entries_keep_roster_order() {
        let registry = MemberRegistry::builder()
            .members(vec![
                Member::new("M002", "Jane", "Smith"),
                Member::new("M001", "John", "Doe"),
            ])
            .build()
            .unwrap();
        let names: Vec<&str> = registry.entries().map(|(_, n)| n).collect();
        assert_eq!(names, vec!["jane smith", "john doe"]);
    }
}
