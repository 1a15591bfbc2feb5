use std::fs::File;
use std::io::prelude::*;
use std::io::BufReader;

use thiserror::Error;

use birdwalk::walker::QueryItem;

#[derive(Debug, Error)]
pub enum ReadErr {
    #[error("cannot read input: {0}")]
    Io(#[from] std::io::Error),

    #[error("bad row: {0}")]
    BadRowFormat(String),

    #[error("bad value on line {line}")]
    BadFormat { line: usize }
}

fn open(path: &str) -> Result<BufReader<File>, ReadErr> {
    Ok(BufReader::new(File::open(path)?))
}

/// Reads the global item weights, one per line.  Line `i` holds item `i`'s weight.
pub fn read_weights(path: &str) -> Result<Vec<f32>, ReadErr> {
    parse_weights(open(path)?)
}

/// Reads the users to items adjacency, one user per line with whitespace
/// separated item ids.  An empty line is a user without interactions.
pub fn read_adjacency(path: &str) -> Result<Vec<Vec<usize>>, ReadErr> {
    parse_adjacency(open(path)?)
}

/// Reads queries, one per line, as `item[:weight]` tokens.  The weight
/// defaults to 1.
pub fn read_queries(path: &str) -> Result<Vec<Vec<QueryItem>>, ReadErr> {
    parse_queries(open(path)?)
}

fn parse_weights<B: BufRead>(br: B) -> Result<Vec<f32>, ReadErr> {
    let mut weights = Vec::new();
    for (i, line) in br.lines().enumerate() {
        let line = line?;
        let w = line.trim().parse::<f32>()
            .map_err(|_| ReadErr::BadFormat { line: i + 1 })?;
        weights.push(w);
    }
    Ok(weights)
}

fn parse_adjacency<B: BufRead>(br: B) -> Result<Vec<Vec<usize>>, ReadErr> {
    let mut users = Vec::new();
    for (i, line) in br.lines().enumerate() {
        let line = line?;
        let items = line.split_whitespace()
            .map(|p| p.parse::<usize>().map_err(|_| ReadErr::BadFormat { line: i + 1 }))
            .collect::<Result<Vec<_>, _>>()?;
        users.push(items);
    }
    Ok(users)
}

fn parse_queries<B: BufRead>(br: B) -> Result<Vec<Vec<QueryItem>>, ReadErr> {
    let mut queries = Vec::new();
    for (i, line) in br.lines().enumerate() {
        let line = line?;
        let mut query = Vec::new();
        for token in line.split_whitespace() {
            let mut pieces = token.splitn(2, ':');
            let item = match pieces.next() {
                Some(p) if !p.is_empty() => p,
                _ => return Err(ReadErr::BadRowFormat(line.to_owned()))
            };
            let item = item.parse::<usize>()
                .map_err(|_| ReadErr::BadFormat { line: i + 1 })?;

            let weight = match pieces.next() {
                Some(w) => w.parse::<f32>().map_err(|_| ReadErr::BadFormat { line: i + 1 })?,
                None    => 1.0
            };
            query.push(QueryItem { item, weight });
        }
        queries.push(query);
    }
    Ok(queries)
}
