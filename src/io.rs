use std::fs::File;
use std::io::{self, BufRead, BufWriter, Write};
use std::path::Path;
use std::str::FromStr;
use std::time::Instant;

use itertools::Itertools;
use log::{info, warn};
use num_format::{Locale, ToFormattedString};

use crate::error::{CfError, Result};
use crate::interactions::{InteractionStore, InteractionStoreBuilder, ItemIdx, UserIdx, UserRecord};

/// Order in which users are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserOrder {
    FirstSeen,
    ById,
}

impl Default for UserOrder {
    fn default() -> Self {
        UserOrder::FirstSeen
    }
}

impl FromStr for UserOrder {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "first_seen" => Ok(UserOrder::FirstSeen),
            "by_id" => Ok(UserOrder::ById),
            other => Err(format!(
                "unknown user order '{}', expected 'first_seen' or 'by_id'",
                other
            )),
        }
    }
}

/// Parses every line of `reader` into a record. A blank line is a `ParseError` unless
/// `skip_malformed_lines` is set, in which case it is logged and skipped.
pub fn read_records<R: BufRead>(reader: R, skip_malformed_lines: bool) -> Result<Vec<UserRecord>> {
    let mut records = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        match UserRecord::parse(&line, index + 1) {
            Ok(record) => records.push(record),
            Err(err) if skip_malformed_lines => warn!("skipping {}", err),
            Err(err) => return Err(CfError::from(err)),
        }
    }
    Ok(records)
}

pub fn read_interactions<R: BufRead>(reader: R, skip_malformed_lines: bool) -> Result<InteractionStore> {
    let mut builder = InteractionStoreBuilder::new();
    for record in read_records(reader, skip_malformed_lines)?.iter() {
        builder.add(record)?;
    }
    Ok(builder.build())
}

pub fn read_interactions_file<P: AsRef<Path>>(
    path: P,
    skip_malformed_lines: bool,
) -> Result<InteractionStore> {
    let start_time = Instant::now();
    let reader = create_buffered_reader(&path)?;
    let store = read_interactions(reader, skip_malformed_lines)?;
    info!(
        "loaded {}: {} users, {} items, {} interactions in {} micros",
        path.as_ref().display(),
        store.num_users().to_formatted_string(&Locale::en),
        store.num_items().to_formatted_string(&Locale::en),
        store.num_interactions().to_formatted_string(&Locale::en),
        start_time.elapsed().as_micros()
    );
    Ok(store)
}

/// Reads held-out interactions for evaluation and keeps only users and items that are
/// known to `store`. Item lists come back sorted.
pub fn read_held_out<P: AsRef<Path>>(
    path: P,
    store: &InteractionStore,
    skip_malformed_lines: bool,
) -> Result<Vec<(UserIdx, Vec<ItemIdx>)>> {
    let reader = create_buffered_reader(&path)?;
    let records = read_records(reader, skip_malformed_lines)?;
    let held_out = records
        .iter()
        .filter_map(|record| {
            let user = store.users().get(&record.user)?;
            let items: Vec<ItemIdx> = record
                .items
                .iter()
                .filter_map(|raw| store.items().get(raw))
                .sorted_unstable()
                .dedup()
                .collect();
            Some((user, items))
        })
        .into_group_map()
        .into_iter()
        .map(|(user, item_lists)| {
            let items = item_lists.into_iter().flatten().sorted_unstable().dedup().collect_vec();
            (user, items)
        })
        .sorted_unstable_by_key(|(user, _)| *user)
        .collect_vec();
    Ok(held_out)
}

fn create_buffered_reader<P: AsRef<Path>>(path: P) -> io::Result<io::BufReader<File>> {
    let file = File::open(path)?;
    Ok(io::BufReader::new(file))
}

/// One line per user: the raw user identifier, a space, then the recommended item
/// identifiers (integers rendered without padding) joined by single spaces.
pub fn format_line(store: &InteractionStore, user: UserIdx, recommendations: &[ItemIdx]) -> String {
    let items = recommendations
        .iter()
        .map(|item| store.item_key(*item).to_string())
        .join(" ");
    format!("{} {}", store.users().raw(user), items)
}

pub fn write_recommendations<W: Write>(
    writer: W,
    store: &InteractionStore,
    recommendations: &[Vec<ItemIdx>],
    user_order: UserOrder,
) -> Result<()> {
    let mut writer = BufWriter::new(writer);
    let mut users: Vec<UserIdx> = (0..recommendations.len() as UserIdx).collect();
    if user_order == UserOrder::ById {
        users.sort_by(|a, b| store.cmp_users(*a, *b));
    }
    for user in users {
        writeln!(
            writer,
            "{}",
            format_line(store, user, &recommendations[user as usize])
        )?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_recommendations_file<P: AsRef<Path>>(
    path: P,
    store: &InteractionStore,
    recommendations: &[Vec<ItemIdx>],
    user_order: UserOrder,
) -> Result<()> {
    let start_time = Instant::now();
    let file = File::create(&path)?;
    write_recommendations(file, store, recommendations, user_order)?;
    info!(
        "wrote {} recommendation lists to {} in {} micros",
        recommendations.len().to_formatted_string(&Locale::en),
        path.as_ref().display(),
        start_time.elapsed().as_micros()
    );
    Ok(())
}
