use crate::models::{PhotoEntry, CHALLENGE_DAYS};
use base64::{Engine, engine::general_purpose::STANDARD};
use chrono::{Local, NaiveDateTime};
use serde::Deserialize;
use std::sync::atomic::{AtomicU64, Ordering};

static PHOTO_SEQUENCE: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Prev,
    Next,
}

pub fn add_photo(existing: &[PhotoEntry], image: String) -> (Vec<PhotoEntry>, PhotoEntry) {
    add_photo_at(existing, image, Local::now().naive_local())
}

/// Prepends a photo taken at `now`. Its day number is fixed here from the
/// count at insertion time, clamped to the challenge length, and never
/// recomputed.
pub fn add_photo_at(
    existing: &[PhotoEntry],
    image: String,
    now: NaiveDateTime,
) -> (Vec<PhotoEntry>, PhotoEntry) {
    let day = (existing.len() + 1).min(usize::from(CHALLENGE_DAYS)) as u8;
    let entry = PhotoEntry {
        id: next_photo_id(now),
        date: now.date(),
        time: now.format("%H:%M").to_string(),
        image,
        day,
    };

    let mut photos = Vec::with_capacity(existing.len() + 1);
    photos.push(entry.clone());
    photos.extend_from_slice(existing);
    (photos, entry)
}

fn next_photo_id(now: NaiveDateTime) -> String {
    let sequence = PHOTO_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!("{}-{sequence}", now.and_utc().timestamp_millis())
}

/// Removes the entry with `id`; an unknown id leaves the log unchanged.
pub fn delete_photo(existing: &[PhotoEntry], id: &str) -> Vec<PhotoEntry> {
    let mut photos = existing.to_vec();
    if let Some(index) = photos.iter().position(|photo| photo.id == id) {
        photos.remove(index);
    }
    photos
}

/// Circular step through the log. With no photos the index comes back as is.
pub fn navigate(existing: &[PhotoEntry], index: usize, direction: Direction) -> usize {
    let len = existing.len();
    if len == 0 {
        return index;
    }
    match direction {
        Direction::Prev if index == 0 => len - 1,
        Direction::Prev => index.min(len) - 1,
        Direction::Next if index >= len - 1 => 0,
        Direction::Next => index + 1,
    }
}

/// Text form of uploaded image bytes.
pub fn encode_image(bytes: &[u8], mime: &str) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}
