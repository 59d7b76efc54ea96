use std::cmp::Ordering;
use std::fmt;

use hashbrown::HashMap;
use hashbrown::HashSet;

use crate::error::{CfError, ParseError, Result};

pub type UserIdx = u32;
pub type ItemIdx = u32;

/// Ordering key of an external identifier. Identifiers that parse as (possibly negative)
/// integers compare numerically and sort before all other identifiers.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ExternalKey {
    Numeric(i128),
    Text(String),
}

impl ExternalKey {
    pub fn parse(raw: &str) -> Self {
        match raw.parse::<i128>() {
            Ok(value) => ExternalKey::Numeric(value),
            Err(_) => ExternalKey::Text(raw.to_string()),
        }
    }
}

impl fmt::Display for ExternalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExternalKey::Numeric(value) => write!(f, "{}", value),
            ExternalKey::Text(raw) => write!(f, "{}", raw),
        }
    }
}

/// Bidirectional map between raw external identifiers and dense indices,
/// assigned in first-seen order.
#[derive(Default, Debug)]
pub struct IdMap {
    to_index: HashMap<String, u32>,
    to_raw: Vec<String>,
}

impl IdMap {
    pub fn new() -> Self {
        IdMap::default()
    }

    /// Returns the index for `raw`, assigning the next free one if it was never seen.
    /// Fails once the `u32` index space is exhausted.
    pub fn intern(&mut self, raw: &str) -> Result<u32> {
        if let Some(index) = self.to_index.get(raw) {
            return Ok(*index);
        }
        let index = next_index(self.to_raw.len())?;
        self.to_index.insert(raw.to_string(), index);
        self.to_raw.push(raw.to_string());
        Ok(index)
    }

    pub fn get(&self, raw: &str) -> Option<u32> {
        self.to_index.get(raw).copied()
    }

    pub fn raw(&self, index: u32) -> &str {
        &self.to_raw[index as usize]
    }

    pub fn len(&self) -> usize {
        self.to_raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.to_raw.is_empty()
    }

    /// Position of every index when all identifiers are sorted by [`ExternalKey`].
    /// Identifiers with equal keys (`"7"` and `"007"`) are ordered by their raw text.
    fn external_order(&self) -> Vec<u32> {
        let keys: Vec<ExternalKey> = self.to_raw.iter().map(|raw| ExternalKey::parse(raw)).collect();
        // every position fits in u32, `intern` never hands out more indices
        let mut indices: Vec<u32> = (0..self.to_raw.len()).map(|index| index as u32).collect();
        indices.sort_by(|&a, &b| {
            keys[a as usize]
                .cmp(&keys[b as usize])
                .then_with(|| self.to_raw[a as usize].cmp(&self.to_raw[b as usize]))
        });
        let mut order = vec![0_u32; indices.len()];
        for (position, index) in indices.into_iter().enumerate() {
            order[index as usize] = position as u32;
        }
        order
    }
}

fn next_index(len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| CfError::TooManyIdentifiers { limit: u32::MAX })
}

/// One line of the interaction file: a user and the raw items it interacted with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub user: String,
    pub items: Vec<String>,
}

impl UserRecord {
    /// Splits a line on arbitrary whitespace; the first token is the user, the rest are items.
    pub fn parse(line: &str, line_number: usize) -> std::result::Result<UserRecord, ParseError> {
        let mut tokens = line.split_whitespace();
        let user = tokens
            .next()
            .ok_or(ParseError::MissingUser { line: line_number })?;
        Ok(UserRecord {
            user: user.to_string(),
            items: tokens.map(str::to_string).collect(),
        })
    }
}

#[derive(Default)]
pub struct InteractionStoreBuilder {
    users: IdMap,
    items: IdMap,
    user_items: Vec<HashSet<ItemIdx>>,
}

impl InteractionStoreBuilder {
    pub fn new() -> Self {
        InteractionStoreBuilder::default()
    }

    /// Adds a record. A user seen before keeps its index and gets the union of both item sets.
    pub fn add(&mut self, record: &UserRecord) -> Result<()> {
        let user = self.users.intern(&record.user)? as usize;
        if user == self.user_items.len() {
            self.user_items.push(HashSet::with_capacity(record.items.len()));
        }
        for raw_item in record.items.iter() {
            let item = self.items.intern(raw_item)?;
            self.user_items[user].insert(item);
        }
        Ok(())
    }

    pub fn build(self) -> InteractionStore {
        let num_items = self.items.len();
        let mut item_support = vec![0_u32; num_items];
        let user_items: Vec<Vec<ItemIdx>> = self
            .user_items
            .into_iter()
            .map(|item_set| {
                let mut items: Vec<ItemIdx> = item_set.into_iter().collect();
                items.sort_unstable();
                for item in items.iter() {
                    item_support[*item as usize] += 1;
                }
                items
            })
            .collect();
        let item_order = self.items.external_order();
        let user_order = self.users.external_order();

        InteractionStore {
            users: self.users,
            items: self.items,
            user_items,
            item_support,
            item_order,
            user_order,
        }
    }
}

/// Deduplicated per-user item sets plus the identifier maps. Immutable once built.
pub struct InteractionStore {
    users: IdMap,
    items: IdMap,
    user_items: Vec<Vec<ItemIdx>>,
    item_support: Vec<u32>,
    item_order: Vec<u32>,
    user_order: Vec<u32>,
}

impl InteractionStore {
    pub fn from_records<'a, I>(records: I) -> Result<InteractionStore>
    where
        I: IntoIterator<Item = &'a UserRecord>,
    {
        let mut builder = InteractionStoreBuilder::new();
        for record in records {
            builder.add(record)?;
        }
        Ok(builder.build())
    }

    pub fn num_users(&self) -> usize {
        self.users.len()
    }

    pub fn num_items(&self) -> usize {
        self.items.len()
    }

    pub fn num_interactions(&self) -> usize {
        self.user_items.iter().map(Vec::len).sum()
    }

    pub fn users(&self) -> &IdMap {
        &self.users
    }

    pub fn items(&self) -> &IdMap {
        &self.items
    }

    /// Items of `user`, sorted by internal index.
    pub fn items_for_user(&self, user: UserIdx) -> &[ItemIdx] {
        &self.user_items[user as usize]
    }

    pub fn user_items(&self) -> &[Vec<ItemIdx>] {
        &self.user_items
    }

    /// Number of distinct users that interacted with each item.
    pub fn item_support(&self) -> &[u32] {
        &self.item_support
    }

    pub fn support(&self, item: ItemIdx) -> u32 {
        self.item_support[item as usize]
    }

    /// Rank of each item in ascending external identifier order.
    pub fn item_order(&self) -> &[u32] {
        &self.item_order
    }

    pub fn cmp_items(&self, a: ItemIdx, b: ItemIdx) -> Ordering {
        self.item_order[a as usize].cmp(&self.item_order[b as usize])
    }

    pub fn cmp_users(&self, a: UserIdx, b: UserIdx) -> Ordering {
        self.user_order[a as usize].cmp(&self.user_order[b as usize])
    }

    pub fn item_key(&self, item: ItemIdx) -> ExternalKey {
        ExternalKey::parse(self.items.raw(item))
    }
}

#[cfg(test)]
mod interactions_test {
    use super::*;

    fn record(line: &str) -> UserRecord {
        UserRecord::parse(line, 1).unwrap()
    }

    #[test]
    fn should_assign_indices_in_first_seen_order() {
        let mut ids = IdMap::new();
        assert_eq!(0, ids.intern("b").unwrap());
        assert_eq!(1, ids.intern("a").unwrap());
        assert_eq!(0, ids.intern("b").unwrap());
        assert_eq!(Some(1), ids.get("a"));
        assert_eq!(None, ids.get("c"));
        assert_eq!("b", ids.raw(0));
        assert_eq!(2, ids.len());
    }

    #[test]
    fn should_split_on_any_whitespace() {
        let parsed = record("  u1\t10   20\t\t30 ");
        assert_eq!("u1", parsed.user);
        assert_eq!(vec!["10", "20", "30"], parsed.items);
    }

    #[test]
    fn should_reject_blank_lines() {
        assert_eq!(
            Err(ParseError::MissingUser { line: 7 }),
            UserRecord::parse(" \t ", 7)
        );
        assert_eq!(Err(ParseError::MissingUser { line: 1 }), UserRecord::parse("", 1));
    }

    #[test]
    fn should_accept_user_without_items() {
        let parsed = record("lonely");
        assert!(parsed.items.is_empty());
        let store = InteractionStore::from_records(&[parsed]).unwrap();
        assert_eq!(1, store.num_users());
        assert!(store.items_for_user(0).is_empty());
    }

    #[test]
    fn should_deduplicate_and_count_support() {
        let records = vec![record("u1 10 20 10 10"), record("u2 20 30"), record("u1 30")];
        let store = InteractionStore::from_records(&records).unwrap();
        assert_eq!(2, store.num_users());
        assert_eq!(3, store.num_items());
        // u1 appears twice and gets the union
        assert_eq!(&[0, 1, 2], store.items_for_user(0));
        assert_eq!(&[1, 2], store.items_for_user(1));
        assert_eq!(&[1, 2, 2], store.item_support());
        assert_eq!(5, store.num_interactions());
    }

    #[test]
    fn should_order_identifiers_numerically() {
        let records = vec![record("u1 100 9 abc 20")];
        let store = InteractionStore::from_records(&records).unwrap();
        // first-seen indices: 100 -> 0, 9 -> 1, abc -> 2, 20 -> 3
        assert_eq!(&[2, 0, 3, 1], store.item_order());
        assert_eq!(Ordering::Less, store.cmp_items(1, 0));
        assert_eq!(ExternalKey::Numeric(9), store.item_key(1));
        assert_eq!("abc", store.item_key(2).to_string());
    }

    #[test]
    fn should_render_numeric_keys_as_integers() {
        assert_eq!("7", ExternalKey::parse("007").to_string());
        assert!(ExternalKey::parse("99") < ExternalKey::parse("a"));
    }

    #[test]
    fn should_order_negative_identifiers_numerically() {
        assert_eq!(ExternalKey::Numeric(-5), ExternalKey::parse("-5"));
        assert_eq!("-5", ExternalKey::parse("-5").to_string());
        assert!(ExternalKey::parse("-5") < ExternalKey::parse("3"));
        assert!(ExternalKey::parse("18446744073709551615") > ExternalKey::parse("-1"));

        let store = InteractionStore::from_records(&[record("u 3 -5 x")]).unwrap();
        // first-seen indices: 3 -> 0, -5 -> 1, x -> 2
        assert_eq!(&[1, 0, 2], store.item_order());
    }

    #[test]
    fn should_fail_when_index_space_is_exhausted() {
        assert_eq!(u32::MAX, next_index(u32::MAX as usize).unwrap());
        assert!(matches!(
            next_index(u32::MAX as usize + 1),
            Err(CfError::TooManyIdentifiers { .. })
        ));
    }
}
