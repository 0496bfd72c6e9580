//! Binary persistence for the weights and biases of a `Sequence`.
//!
//! Layout, with every integer a native-endian `u32` and every scalar a
//! native-endian `f32`:
//!
//! ```text
//! magic              4 bytes, "NNMD"
//! layer_count        u32
//! per parameterised node, in traversal order:
//!     weight_count   u32
//!     bias_count     u32
//!     input_rank     u32, then input_rank dims
//!     output_rank    u32, then output_rank dims
//!     weights        f32[weight_count]
//!     biases         f32[bias_count]
//! ```
//!
//! No node type is recorded. A file can only be loaded into a sequence built
//! with the same architecture; the reader fills existing nodes and never
//! creates any.

use log::{debug, info, warn};
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::error::{Result, SeqnetError};
use crate::math::{Buffer, Scalar, TensorShape};
use crate::network::sequence::Sequence;
use crate::node::ParameterisedNode;

pub const MODEL_MAGIC: [u8; 4] = *b"NNMD";

const SCALAR_BYTES: usize = std::mem::size_of::<Scalar>();

/// Sizes and shapes stored for one layer, without its payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerRecord {
    pub weight_count: u32,
    pub bias_count: u32,
    pub input_shape: TensorShape,
    pub output_shape: TensorShape,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelHeader {
    pub layers: Vec<LayerRecord>,
}

// ---------------------------------------------------------------------------
// Public entry points
// ---------------------------------------------------------------------------

/// Writes the parameters of every parameterised node in `seq` to `path`.
pub fn save_model<P: AsRef<Path>>(seq: &Sequence, path: P) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|source| {
        warn!("could not write: {}", path.display());
        SeqnetError::Open { path: path.to_path_buf(), source }
    })?;
    let mut writer = BufWriter::new(file);
    write_model(seq, &mut writer)?;
    writer.flush()?;
    info!("saved {} layers to {}", seq.parameterised().len(), path.display());
    Ok(())
}

/// Restores parameters from `path` into an already-built `seq`.
///
/// On any error the parameters of `seq` are left untouched.
pub fn load_model<P: AsRef<Path>>(seq: &mut Sequence, path: P) -> Result<()> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| {
        warn!("could not read file: {}", path.display());
        SeqnetError::Open { path: path.to_path_buf(), source }
    })?;
    read_model(seq, &mut BufReader::new(file))?;
    info!("loaded {} layers from {}", seq.parameterised().len(), path.display());
    Ok(())
}

/// Reads only the header of the model file at `path`.
pub fn inspect_model<P: AsRef<Path>>(path: P) -> Result<ModelHeader> {
    let path = path.as_ref();
    let file = File::open(path)
        .map_err(|source| SeqnetError::Open { path: path.to_path_buf(), source })?;
    read_header(&mut BufReader::new(file))
}

pub fn write_model<W: Write>(seq: &Sequence, out: &mut W) -> Result<()> {
    let layers = seq.parameterised();

    out.write_all(&MODEL_MAGIC)?;
    write_u32(out, layers.len())?;

    for (index, layer) in layers.iter().enumerate() {
        let w = &layer.get_w().value;
        let b = &layer.get_b().value;
        debug!("writing layer {index}: {} weights, {} biases", w.size(), b.size());

        write_u32(out, w.size())?;
        write_u32(out, b.size())?;
        write_shape(out, layer.input_shape())?;
        write_shape(out, layer.output_shape())?;
        write_scalars(out, w.as_slice())?;
        write_scalars(out, b.as_slice())?;
    }

    Ok(())
}

/// Validates the whole stream against `seq` before overwriting anything.
///
/// Every layer's header is checked and every payload is read into staging
/// buffers first, so a mismatch or short read in any layer leaves all of
/// `seq`'s tensors unmodified.
pub fn read_model<R: Read>(seq: &mut Sequence, input: &mut R) -> Result<()> {
    let staged = {
        let layers = seq.parameterised();
        read_staged(&layers, input).map_err(|e| {
            warn!("rejected model file: {e}");
            e
        })?
    };

    for (layer, (w, b)) in seq.parameterised_mut().into_iter().zip(staged) {
        layer.get_w_mut().value = w;
        layer.get_b_mut().value = b;
    }
    Ok(())
}

/// Reads the magic tag and every layer record, skipping the payloads.
pub fn read_header<R: Read>(input: &mut R) -> Result<ModelHeader> {
    read_magic(input)?;
    let count = read_u32(input)?;
    let mut layers = Vec::new();

    for _ in 0..count {
        let weight_count = read_u32(input)?;
        let bias_count = read_u32(input)?;
        let input_shape = read_shape(input)?;
        let output_shape = read_shape(input)?;
        skip_scalars(input, weight_count as u64 + bias_count as u64)?;
        layers.push(LayerRecord { weight_count, bias_count, input_shape, output_shape });
    }

    Ok(ModelHeader { layers })
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

fn read_staged<R: Read>(
    layers: &[&dyn ParameterisedNode],
    input: &mut R,
) -> Result<Vec<(Buffer, Buffer)>> {
    read_magic(input)?;

    let found = read_u32(input)? as usize;
    if found != layers.len() {
        return Err(SeqnetError::LayerCountMismatch { expected: layers.len(), found });
    }

    let mut staged = Vec::with_capacity(layers.len());
    for (index, layer) in layers.iter().enumerate() {
        let w_size = layer.get_w().size();
        let b_size = layer.get_b().size();

        expect_count(input, index, "weight", w_size)?;
        expect_count(input, index, "bias", b_size)?;
        expect_shape(input, index, "input", layer.input_shape())?;
        expect_shape(input, index, "output", layer.output_shape())?;

        let w = read_scalars(input, w_size)?;
        let b = read_scalars(input, b_size)?;
        debug!("staged layer {index}: {w_size} weights, {b_size} biases");
        staged.push((w, b));
    }

    Ok(staged)
}

fn read_magic<R: Read>(input: &mut R) -> Result<()> {
    let mut found = [0u8; 4];
    input.read_exact(&mut found)?;
    if found != MODEL_MAGIC {
        return Err(SeqnetError::BadMagic { found });
    }
    Ok(())
}

fn expect_count<R: Read>(
    input: &mut R,
    layer: usize,
    tensor: &'static str,
    expected: usize,
) -> Result<()> {
    let found = read_u32(input)? as usize;
    if found != expected {
        return Err(SeqnetError::ParameterCountMismatch { layer, tensor, expected, found });
    }
    Ok(())
}

/// Checks the rank, then each dimension in turn.
fn expect_shape<R: Read>(
    input: &mut R,
    layer: usize,
    which: &'static str,
    shape: &TensorShape,
) -> Result<()> {
    let rank = read_u32(input)? as usize;
    if rank != shape.rank() {
        return Err(SeqnetError::ShapeRankMismatch {
            layer,
            which,
            expected: shape.rank(),
            found: rank,
        });
    }
    for (dim, &expected) in shape.dims().iter().enumerate() {
        let found = read_u32(input)?;
        if found != expected {
            return Err(SeqnetError::ShapeDimMismatch { layer, which, dim, expected, found });
        }
    }
    Ok(())
}

fn write_u32<W: Write>(out: &mut W, value: usize) -> io::Result<()> {
    let value = u32::try_from(value)
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "value does not fit in u32"))?;
    out.write_all(&value.to_ne_bytes())
}

fn read_u32<R: Read>(input: &mut R) -> io::Result<u32> {
    let mut bytes = [0u8; 4];
    input.read_exact(&mut bytes)?;
    Ok(u32::from_ne_bytes(bytes))
}

fn write_shape<W: Write>(out: &mut W, shape: &TensorShape) -> io::Result<()> {
    write_u32(out, shape.rank())?;
    for &d in shape.dims() {
        out.write_all(&d.to_ne_bytes())?;
    }
    Ok(())
}

fn read_shape<R: Read>(input: &mut R) -> io::Result<TensorShape> {
    let rank = read_u32(input)?;
    // Pushed one at a time: a corrupt rank runs into EOF instead of a huge allocation.
    let mut dims = Vec::new();
    for _ in 0..rank {
        dims.push(read_u32(input)?);
    }
    Ok(TensorShape::new(dims))
}

fn write_scalars<W: Write>(out: &mut W, values: &[Scalar]) -> io::Result<()> {
    let mut bytes = Vec::with_capacity(values.len() * SCALAR_BYTES);
    for v in values {
        bytes.extend_from_slice(&v.to_ne_bytes());
    }
    out.write_all(&bytes)
}

fn read_scalars<R: Read>(input: &mut R, count: usize) -> io::Result<Buffer> {
    let mut bytes = vec![0u8; count * SCALAR_BYTES];
    input.read_exact(&mut bytes)?;
    let values = bytes
        .chunks_exact(SCALAR_BYTES)
        .map(|c| Scalar::from_ne_bytes([c[0], c[1], c[2], c[3]]))
        .collect();
    Ok(Buffer::from_vec(values))
}

fn skip_scalars<R: Read>(input: &mut R, count: u64) -> io::Result<()> {
    let expected = count * SCALAR_BYTES as u64;
    let skipped = io::copy(&mut input.by_ref().take(expected), &mut io::sink())?;
    if skipped != expected {
        return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "model payload is truncated"));
    }
    Ok(())
}
