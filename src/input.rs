use crate::error::Result;
use crate::model::CommitRecord;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

pub fn load_commits<P: AsRef<Path>>(path: Option<P>) -> Result<Vec<CommitRecord>> {
    match path {
        Some(p) => read_commits(BufReader::new(File::open(p.as_ref())?)),
        None => read_commits(io::stdin().lock()),
    }
}

pub fn read_commits<R: Read>(reader: R) -> Result<Vec<CommitRecord>> {
    Ok(serde_json::from_reader(reader)?)
}

pub fn parse_commits(raw: &str) -> Result<Vec<CommitRecord>> {
    Ok(serde_json::from_str(raw)?)
}
