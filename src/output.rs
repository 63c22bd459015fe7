use std::fs::OpenOptions;
use std::io::{self, Write};
use std::mem::take;
use std::path::Path;

use anyhow::{Context, Result};

use crate::model::{Castaway, CastawayCollection};

const SEP: char = '\t';
const LINE_END: &str = "\r\n";

// ── Writing ──

pub fn header(max_tracks: usize) -> Vec<String> {
    let mut row: Vec<String> = [
        "Castaway",
        "Job",
        "URL",
        "Episode title",
        "Book",
        "Luxury",
        "Favourite track",
        "Presenter",
        "Date first broadcast",
        "Time first broadcast",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    for i in 1..=max_tracks {
        row.push(format!("Artist {}", i));
        row.push(format!("Song {}", i));
    }
    row
}

/// One output row. Track columns are padded so every row is as wide as the
/// header.
pub fn castaway_row(c: &Castaway, max_tracks: usize) -> Vec<String> {
    let e = &c.episode;
    let mut row = vec![
        c.name.clone(),
        c.job.clone(),
        c.url.clone(),
        e.title.clone(),
        e.book.clone(),
        e.luxury.clone(),
        e.favourite_track.clone(),
        e.presenter.clone(),
        e.date_text(),
        e.time_text(),
    ];
    for t in e.tracks.iter().take(max_tracks) {
        row.push(t.artist.clone());
        row.push(t.song.clone());
    }
    row.resize(10 + 2 * max_tracks, String::new());
    row
}

fn needs_quotes(field: &str) -> bool {
    field.contains(SEP) || field.contains('"') || field.contains('\n') || field.contains('\r')
}

pub fn write_row<W: Write>(mut w: W, row: &[String]) -> io::Result<()> {
    let mut first = true;
    for cell in row {
        if !first {
            write!(w, "{}", SEP)?;
        } else {
            first = false;
        }
        if needs_quotes(cell) {
            write!(w, "\"{}\"", cell.replace('"', "\"\""))?;
        } else {
            write!(w, "{}", cell)?;
        }
    }
    write!(w, "{}", LINE_END)
}

pub fn write_tsv<W: Write>(
    mut w: W,
    castaways: &CastawayCollection,
    max_tracks: usize,
    with_header: bool,
) -> io::Result<()> {
    if with_header {
        write_row(&mut w, &header(max_tracks))?;
    }
    for c in castaways.iter() {
        write_row(&mut w, &castaway_row(c, max_tracks))?;
    }
    w.flush()
}

/// Append to `path`, writing the header only into an empty file.
pub fn append_tsv(path: &Path, castaways: &CastawayCollection, max_tracks: usize) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening {}", path.display()))?;
    let empty = file.metadata()?.len() == 0;
    write_tsv(io::BufWriter::new(file), castaways, max_tracks, empty)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

// ── Reading ──

/// Tab-separated rows, quotes and CRLF tolerant. Blank lines are dropped.
pub fn parse_rows(text: &str) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut field = String::new();
    let mut row = Vec::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' if field.is_empty() => in_quotes = true,
            c if c == SEP && !in_quotes => row.push(take(&mut field)),
            '\n' | '\r' if !in_quotes => {
                if ch == '\r' && chars.peek() == Some(&'\n') {
                    chars.next();
                }
                row.push(take(&mut field));
                if !(row.len() == 1 && row[0].is_empty()) {
                    rows.push(take(&mut row));
                } else {
                    row.clear();
                }
            }
            _ => field.push(ch),
        }
    }

    if !field.is_empty() || !row.is_empty() {
        row.push(field);
        rows.push(row);
    }
    rows
}

/// Every non-blank `Artist i` cell, row by row. Header rows repeated by
/// appending runs are skipped.
pub fn artists(text: &str) -> Vec<String> {
    let mut rows = parse_rows(text).into_iter();
    let Some(head) = rows.next() else {
        return Vec::new();
    };
    let columns: Vec<usize> = head
        .iter()
        .enumerate()
        .filter(|(_, name)| is_artist_column(name))
        .map(|(i, _)| i)
        .collect();

    rows.filter(|row| *row != head)
        .flat_map(|row| {
            columns
                .iter()
                .filter_map(|&i| row.get(i))
                .map(|cell| cell.trim())
                .filter(|cell| !cell.is_empty())
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .collect()
}

fn is_artist_column(name: &str) -> bool {
    name.strip_prefix("Artist ")
        .is_some_and(|n| n.parse::<usize>().is_ok())
}

// ── Tests ──
