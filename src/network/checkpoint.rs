//! Binary checkpoints of a network's weights and biases.
//!
//! The payload is, for every layer in topology order, the weight matrix in
//! column-major order followed by the bias vector, each value a
//! little-endian IEEE-754 `f64`. A [`CheckpointFormat::Legacy`] file is the
//! bare payload. A [`CheckpointFormat::Headered`] file prefixes it with
//!
//! ```text
//! bytes 0-3:   b"FMLP"
//! bytes 4-7:   format version, u32 LE (1)
//! bytes 8-11:  layer count n, u32 LE
//! next 4n:     layer widths, u32 LE each
//! next 8:      parameter count, u64 LE
//! ```
//!
//! Readers accept both: a file starting with the magic must carry a valid
//! header, anything else is read as legacy and must be exactly the payload
//! size. A legacy file whose first weight happens to begin with the magic
//! bytes is therefore rejected.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::activation::Activation;
use crate::error::{NetworkError, Result};
use crate::math::Matrix;
use crate::network::network::Network;
use crate::network::output::OutputMode;
use crate::network::topology::Topology;

pub const CHECKPOINT_MAGIC: [u8; 4] = *b"FMLP";
pub const CHECKPOINT_VERSION: u32 = 1;

const F64_BYTES: usize = std::mem::size_of::<f64>();

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckpointFormat {
    /// Bare payload, no header.
    Legacy,
    /// Payload preceded by magic, version and topology.
    #[default]
    Headered,
}

/// Byte length of a legacy checkpoint for `topology`.
pub fn legacy_len(topology: &Topology) -> usize {
    topology.parameter_count() * F64_BYTES
}

fn header_len(topology: &Topology) -> usize {
    4 + 4 + 4 + 4 * topology.num_layers() + 8
}

/// Writes parameters in `format`. `weights` and `biases` must match `topology`.
pub fn write_parameters<W: Write>(
    writer: &mut W,
    topology: &Topology,
    weights: &[Matrix],
    biases: &[Vec<f64>],
    format: CheckpointFormat,
) -> Result<()> {
    if format == CheckpointFormat::Headered {
        writer.write_all(&CHECKPOINT_MAGIC)?;
        writer.write_all(&CHECKPOINT_VERSION.to_le_bytes())?;
        writer.write_all(&(topology.num_layers() as u32).to_le_bytes())?;
        for &width in topology.widths() {
            writer.write_all(&(width as u32).to_le_bytes())?;
        }
        writer.write_all(&(topology.parameter_count() as u64).to_le_bytes())?;
    }
    for (w, b) in weights.iter().zip(biases) {
        for x in w.iter_column_major().chain(b.iter().copied()) {
            writer.write_all(&x.to_le_bytes())?;
        }
    }
    Ok(())
}

/// Reads parameters written by [`write_parameters`] in either format.
///
/// # Errors
/// - `CorruptCheckpoint` if the byte count does not match `topology`.
/// - `TopologyMismatch` if a header names other widths.
/// - `UnsupportedCheckpointVersion` for a header from a newer writer.
pub fn read_parameters<R: Read>(reader: &mut R, topology: &Topology) -> Result<(Vec<Matrix>, Vec<Vec<f64>>)> {
    // One byte past the largest valid file is enough to reject anything longer.
    let limit = legacy_len(topology) + header_len(topology) + 1;
    let mut bytes = Vec::new();
    reader.by_ref().take(limit as u64).read_to_end(&mut bytes)?;

    let expected = legacy_len(topology);
    let payload = if bytes.starts_with(&CHECKPOINT_MAGIC) {
        let offset = parse_header(&bytes, topology)?;
        &bytes[offset..]
    } else if bytes.len() == expected {
        &bytes[..]
    } else {
        return Err(NetworkError::CorruptCheckpoint { expected, got: bytes.len() });
    };
    if payload.len() != expected {
        return Err(NetworkError::CorruptCheckpoint {
            expected: expected + header_len(topology),
            got: bytes.len(),
        });
    }

    let mut values = payload
        .chunks_exact(F64_BYTES)
        .map(|chunk| {
            let mut buf = [0u8; F64_BYTES];
            buf.copy_from_slice(chunk);
            f64::from_le_bytes(buf)
        });
    let mut weights = Vec::with_capacity(topology.num_transitions());
    let mut biases = Vec::with_capacity(topology.num_transitions());
    for i in 0..topology.num_transitions() {
        let (rows, cols) = topology.weight_shape(i);
        let flat: Vec<f64> = values.by_ref().take(rows * cols).collect();
        let w = Matrix::from_column_major(rows, cols, &flat)
            .ok_or(NetworkError::CorruptCheckpoint { expected, got: payload.len() })?;
        weights.push(w);
        biases.push(values.by_ref().take(rows).collect());
    }
    Ok((weights, biases))
}

/// Validates a header and returns the payload offset.
fn parse_header(bytes: &[u8], topology: &Topology) -> Result<usize> {
    let corrupt = || NetworkError::CorruptCheckpoint {
        expected: legacy_len(topology) + header_len(topology),
        got: bytes.len(),
    };
    let mut cursor = 4;
    let mut next_u32 = || -> Result<u32> {
        let field = bytes.get(cursor..cursor + 4).ok_or_else(corrupt)?;
        cursor += 4;
        let mut buf = [0u8; 4];
        buf.copy_from_slice(field);
        Ok(u32::from_le_bytes(buf))
    };

    let version = next_u32()?;
    if version != CHECKPOINT_VERSION {
        return Err(NetworkError::UnsupportedCheckpointVersion(version));
    }
    let layers = next_u32()? as usize;
    // A count larger than the file itself can only be garbage.
    if layers > bytes.len() / 4 {
        return Err(corrupt());
    }
    let found = (0..layers)
        .map(|_| next_u32().map(|w| w as usize))
        .collect::<Result<Vec<usize>>>()?;
    if found != topology.widths() {
        return Err(NetworkError::TopologyMismatch { expected: topology.widths().to_vec(), found });
    }

    let field = bytes.get(cursor..cursor + 8).ok_or_else(corrupt)?;
    let mut buf = [0u8; 8];
    buf.copy_from_slice(field);
    if u64::from_le_bytes(buf) != topology.parameter_count() as u64 {
        return Err(corrupt());
    }
    Ok(cursor + 8)
}

impl<A: Activation, O: OutputMode> Network<A, O> {
    /// Writes the weights and biases to `path`, replacing any existing file.
    /// Accumulated gradients and the learning rate are not saved.
    pub fn save<P: AsRef<Path>>(&self, path: P, format: CheckpointFormat) -> Result<()> {
        let path = path.as_ref();
        let mut writer = BufWriter::new(File::create(path)?);
        write_parameters(&mut writer, self.topology(), &self.weights, &self.biases, format)?;
        writer.flush()?;
        debug!("saved {:?} checkpoint to {}", format, path.display());
        Ok(())
    }

    /// Loads a network from `path`, or builds a fresh one if the file
    /// cannot be opened. Gradients always start at zero.
    ///
    /// # Errors
    /// Fails if the file opens but does not hold parameters for `topology`.
    pub fn load<P: AsRef<Path>>(path: P, topology: Topology, activation: A) -> Result<Self> {
        let path = path.as_ref();
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) => {
                warn!("cannot open checkpoint {}: {e}; starting from fresh parameters", path.display());
                return Ok(Self::new(topology, activation));
            }
        };
        let (weights, biases) = read_parameters(&mut BufReader::new(file), &topology)?;
        debug!("loaded checkpoint {}", path.display());
        Self::from_parameters(topology, activation, weights, biases)
    }

    /// Overwrites the parameters with a checkpoint read from `reader` and
    /// clears the accumulated gradients.
    pub fn restore<R: Read>(&mut self, reader: &mut R) -> Result<()> {
        let (weights, biases) = read_parameters(reader, self.topology())?;
        self.weights = weights;
        self.biases = biases;
        self.gradients.reset();
        Ok(())
    }

    /// Writes the parameters to any writer.
    pub fn write_to<W: Write>(&self, writer: &mut W, format: CheckpointFormat) -> Result<()> {
        write_parameters(writer, self.topology(), &self.weights, &self.biases, format)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Cursor;

    fn topology() -> Topology {
        Topology::new([2, 3, 1]).unwrap()
    }

    fn parameters() -> (Vec<Matrix>, Vec<Vec<f64>>) {
        let w0 = Matrix::from_data(vec![vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]]).unwrap();
        let w1 = Matrix::from_data(vec![vec![7.0, 8.0, 9.0]]).unwrap();
        (vec![w0, w1], vec![vec![0.1, 0.2, 0.3], vec![0.4]])
    }

    fn encode(format: CheckpointFormat) -> Vec<u8> {
        let (w, b) = parameters();
        let mut bytes = Vec::new();
        write_parameters(&mut bytes, &topology(), &w, &b, format).unwrap();
        bytes
    }

    #[test]
    fn test_legacy_layout_is_column_major_then_bias() {
        let bytes = encode(CheckpointFormat::Legacy);
        assert_eq!(bytes.len(), legacy_len(&topology()));
        let values: Vec<f64> = bytes
            .chunks_exact(8)
            .map(|c| f64::from_le_bytes(c.try_into().unwrap()))
            .collect();
        assert_eq!(values, vec![1.0, 3.0, 5.0, 2.0, 4.0, 6.0, 0.1, 0.2, 0.3, 7.0, 8.0, 9.0, 0.4]);
    }

    #[test]
    fn test_header_fields() {
        let bytes = encode(CheckpointFormat::Headered);
        assert_eq!(&bytes[..4], b"FMLP");
        assert_eq!(bytes.len(), legacy_len(&topology()) + header_len(&topology()));
        assert_eq!(u32::from_le_bytes(bytes[8..12].try_into().unwrap()), 3);
    }

    #[test]
    fn test_both_formats_read_back() {
        for format in [CheckpointFormat::Legacy, CheckpointFormat::Headered] {
            let bytes = encode(format);
            let (w, b) = read_parameters(&mut Cursor::new(bytes), &topology()).unwrap();
            assert_eq!((w, b), parameters());
        }
    }

    #[test]
    fn test_truncated_legacy_is_corrupt() {
        let mut bytes = encode(CheckpointFormat::Legacy);
        bytes.truncate(bytes.len() - 3);
        let err = read_parameters(&mut Cursor::new(bytes), &topology()).unwrap_err();
        assert!(matches!(err, NetworkError::CorruptCheckpoint { expected: 104, got: 101 }));
    }

    #[test]
    fn test_truncated_headered_is_corrupt() {
        let mut bytes = encode(CheckpointFormat::Headered);
        bytes.truncate(bytes.len() - 8);
        let err = read_parameters(&mut Cursor::new(bytes), &topology()).unwrap_err();
        assert!(matches!(err, NetworkError::CorruptCheckpoint { .. }));
    }

    #[test]
    fn test_header_topology_mismatch() {
        let bytes = encode(CheckpointFormat::Headered);
        let other = Topology::new([2, 4, 1]).unwrap();
        let err = read_parameters(&mut Cursor::new(bytes), &other).unwrap_err();
        match err {
            NetworkError::TopologyMismatch { expected, found } => {
                assert_eq!(expected, vec![2, 4, 1]);
                assert_eq!(found, vec![2, 3, 1]);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_unknown_version() {
        let mut bytes = encode(CheckpointFormat::Headered);
        bytes[4] = 9;
        let err = read_parameters(&mut Cursor::new(bytes), &topology()).unwrap_err();
        assert!(matches!(err, NetworkError::UnsupportedCheckpointVersion(9)));
    }

    #[test]
    fn test_oversized_file_is_read_only_up_to_limit() {
        let err = read_parameters(&mut Cursor::new(vec![0u8; 1 << 20]), &topology()).unwrap_err();
        assert!(matches!(err, NetworkError::CorruptCheckpoint { expected: 104, got: 137 }));

        let mut bytes = encode(CheckpointFormat::Headered);
        bytes.extend_from_slice(&[0u8; 64]);
        let err = read_parameters(&mut Cursor::new(bytes), &topology()).unwrap_err();
        assert!(matches!(err, NetworkError::CorruptCheckpoint { expected: 136, got: 137 }));
    }

    #[test]
    fn test_empty_file_is_corrupt() {
        let err = read_parameters(&mut Cursor::new(Vec::new()), &topology()).unwrap_err();
        assert!(matches!(err, NetworkError::CorruptCheckpoint { got: 0, .. }));
    }
}
