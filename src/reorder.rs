//! Rank reordering configuration: the literal `LAIK_REORDERING` map, the
//! `LAIK_REORDER_FILE` binary dump, and the `LAIK_REORDER_LIVE` trigger for
//! an on-the-fly QAP remap.
//!
//! Grounded on `laik_top_reordering` (`topology/topology.c`). Precedence is
//! `LIVE > REORDERING > FILE`; if both a literal map and a file are
//! configured and the caller is rank 0, the literal map is written to the
//! file for other ranks to pick up. The original's file-read path is a stub
//! (`fstat` only, body elided with a `// TODO`); this crate implements the
//! read side fully, as a little-endian `{u32 nodecount, i32[nodecount]}`
//! record matching what the write side produces.

use crate::commmatrix::CommMatrix;
use crate::error::RankmeshError;
use crate::qap::remap;
use crate::topology::Topology;
use std::fs;
use std::io::Write as _;
use std::path::Path;

/// Sentinel written for a task with no override: `0` means unmapped,
/// otherwise the stored value is `physical_location + 1`.
const UNMAPPED: i32 = 0;

/// A resolved `task -> physical location` map. `None` entries mean the task
/// keeps its default (identity) placement.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Reordering {
    map: Vec<Option<usize>>,
}

impl Reordering {
    pub fn identity(n: usize) -> Self {
        Reordering { map: vec![None; n] }
    }

    pub fn from_permutation(order: Vec<usize>) -> Self {
        Reordering {
            map: order.into_iter().map(Some).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn get(&self, task: usize) -> Option<usize> {
        self.map[task]
    }

    pub fn set(&mut self, task: usize, location: usize) {
        self.map[task] = Some(location);
    }

    /// Parse a `LAIK_REORDERING`-style literal, e.g. `2.3,0.4,5.1`
    /// (`task.location`, comma-separated). Entries naming a task past `n`
    /// are ignored, matching the original's bounds check.
    pub fn parse_literal(text: &str, n: usize) -> Result<Reordering, RankmeshError> {
        let mut r = Reordering::identity(n);
        for entry in text.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let (k, v) = entry.split_once('.').ok_or_else(|| {
                RankmeshError::BadConfig(format!("malformed reordering entry {entry:?}, expected task.location"))
            })?;
            let task: usize = k
                .parse()
                .map_err(|_| RankmeshError::BadConfig(format!("bad task index in {entry:?}")))?;
            let location: usize = v
                .parse()
                .map_err(|_| RankmeshError::BadConfig(format!("bad location index in {entry:?}")))?;
            if task >= n {
                continue;
            }
            r.set(task, location);
        }
        Ok(r)
    }

    /// Serialize as `{u32 nodecount LE, i32[nodecount] LE}`, `0` for unmapped
    /// and `location + 1` otherwise.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(4 + self.map.len() * 4);
        buf.extend_from_slice(&(self.map.len() as u32).to_le_bytes());
        for entry in &self.map {
            let encoded = match entry {
                None => UNMAPPED,
                Some(loc) => *loc as i32 + 1,
            };
            buf.extend_from_slice(&encoded.to_le_bytes());
        }
        buf
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Reordering, RankmeshError> {
        if bytes.len() < 4 {
            return Err(RankmeshError::BadConfig("reordering file too short for header".into()));
        }
        let n = u32::from_le_bytes(bytes[0..4].try_into().unwrap()) as usize;
        let expected_len = 4 + n * 4;
        if bytes.len() != expected_len {
            return Err(RankmeshError::BadConfig(format!(
                "reordering file has {} bytes, expected {expected_len} for {n} entries",
                bytes.len()
            )));
        }
        let mut map = Vec::with_capacity(n);
        for i in 0..n {
            let off = 4 + i * 4;
            let raw = i32::from_le_bytes(bytes[off..off + 4].try_into().unwrap());
            map.push(if raw == UNMAPPED { None } else { Some((raw - 1) as usize) });
        }
        Ok(Reordering { map })
    }

    pub fn write_file(&self, path: &Path) -> Result<(), RankmeshError> {
        let mut f = fs::File::create(path)
            .map_err(|e| RankmeshError::BadConfig(format!("could not open reordering file for write: {e}")))?;
        f.write_all(&self.to_bytes())
            .map_err(|e| RankmeshError::BadConfig(format!("could not write reordering file: {e}")))
    }

    pub fn read_file(path: &Path) -> Result<Reordering, RankmeshError> {
        let bytes = fs::read(path)
            .map_err(|e| RankmeshError::BadConfig(format!("could not read reordering file: {e}")))?;
        Reordering::from_bytes(&bytes)
    }
}

/// The three environment variables governing reordering, read as plain
/// strings so callers (and tests) can inject values without touching the
/// real process environment.
pub struct ReorderEnv {
    pub reordering: Option<String>,
    pub reorder_file: Option<String>,
    pub reorder_live: bool,
}

impl ReorderEnv {
    pub fn from_process_env() -> Self {
        ReorderEnv {
            reordering: std::env::var("LAIK_REORDERING").ok(),
            reorder_file: std::env::var("LAIK_REORDER_FILE").ok(),
            reorder_live: std::env::var("LAIK_REORDER_LIVE").is_ok(),
        }
    }
}

/// Resolve the configured reordering, following `LIVE > REORDERING > FILE`
/// precedence. `cm`/`topology` are only consulted for the `LIVE` case.
pub fn resolve(
    env: &ReorderEnv,
    n: usize,
    my_location_id: usize,
    cm: &CommMatrix,
    topology: &Topology,
) -> Result<Option<Reordering>, RankmeshError> {
    if env.reorder_live {
        let order = remap(cm, topology).ok_or_else(|| {
            RankmeshError::BadConfig("LAIK_REORDER_LIVE requires a matrix topology".into())
        })?;
        return Ok(Some(Reordering::from_permutation(order)));
    }

    if let Some(text) = &env.reordering {
        let reordering = Reordering::parse_literal(text, n)?;
        if let Some(file) = &env.reorder_file {
            if my_location_id == 0 {
                reordering.write_file(Path::new(file))?;
            }
        }
        return Ok(Some(reordering));
    }

    if let Some(file) = &env.reorder_file {
        return Ok(Some(Reordering::read_file(Path::new(file))?));
    }

    Ok(None)
}
