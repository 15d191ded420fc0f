use std::env;
use std::path::{Path, PathBuf};

/// The four canonical bases, in the order the homopolymer checks walk them.
pub const BASES: [u8; 4] = [b'A', b'T', b'G', b'C'];

pub fn project_root() -> PathBuf {
    match env::var_os("PROJECT_ROOT") {
        Some(val) => PathBuf::from(val),
        None => {
            // Fall back to current directory if PROJECT_ROOT not set
            env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
        }
    }
}

/// Resolve a possibly relative path against [`project_root`].
pub fn resolve_path(path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        project_root().join(path)
    }
}

/// Number of G and C symbols in `seq`.
pub fn gc_count(seq: &[u8]) -> usize {
    seq.iter().filter(|&&b| b == b'G' || b == b'C').count()
}

/// GC fraction in [0, 1]; an empty slice has a fraction of 0.
pub fn gc_fraction(seq: &[u8]) -> f64 {
    if seq.is_empty() {
        return 0.0;
    }
    gc_count(seq) as f64 / seq.len() as f64
}

/// GC percentage in [0, 100].
pub fn gc_percent(seq: &[u8]) -> f64 {
    gc_fraction(seq) * 100.0
}

/// True if `seq` contains a run of at least `run` consecutive `base` symbols.
///
/// A zero-length run is trivially present.
pub fn has_homopolymer(seq: &[u8], base: u8, run: usize) -> bool {
    if run == 0 {
        return true;
    }
    let mut current = 0;
    for &b in seq {
        if b == base {
            current += 1;
            if current >= run {
                return true;
            }
        } else {
            current = 0;
        }
    }
    false
}

/// True if any of A, T, G or C forms a run of at least `run`.
pub fn has_any_homopolymer(seq: &[u8], run: usize) -> bool {
    BASES.iter().any(|&base| has_homopolymer(seq, base, run))
}

pub fn is_acgt(seq: &[u8]) -> bool {
    seq.iter().all(|b| matches!(b, b'A' | b'C' | b'G' | b'T'))
}

/// Reverse complement over the ACGT alphabet; anything else becomes `N`.
pub fn reverse_complement(seq: &[u8]) -> Vec<u8> {
    seq.iter()
        .rev()
        .map(|&b| match b {
            b'A' => b'T',
            b'T' => b'A',
            b'G' => b'C',
            b'C' => b'G',
            _ => b'N',
        })
        .collect()
}

/// Round half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
