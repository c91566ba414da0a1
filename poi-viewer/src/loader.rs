//! Loads the point cloud file on a background thread.
//!
//! The loader reports back over a channel: one [LoadUpdate::Progress] per
//! decoded chunk, so the points show up in the window while the file is still
//! being read, followed by either [LoadUpdate::Done] or [LoadUpdate::Failed].

use anyhow::{bail, Context, Result};
use bytemuck::{Pod, Zeroable};
use crossbeam_channel::{Receiver, Sender};
use nalgebra::Vector3;
use pasture_core::containers::VectorBuffer;
use pasture_derive::PointType;
use las::Read as _;
use ply_rs::parser::Parser;
use ply_rs::ply::{ElementDef, Encoding, Property, PropertyAccess};
use std::ffi::OsStr;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::thread;

/// Number of points per chunk handed to the renderer.
const CHUNK_SIZE: usize = 50_000;

/// A message from the loader thread.
pub enum LoadUpdate {
    /// A chunk of points was decoded.
    Progress {
        points: VectorBuffer,
        loaded: usize,
        total: usize,
        has_colors: bool,
    },

    /// The whole file was loaded. No further updates follow.
    Done,

    /// Loading failed. No further updates follow.
    /// Points from earlier [LoadUpdate::Progress] updates must be discarded.
    Failed(anyhow::Error),
}

/// The layout, in which points are handed to the renderer.
#[repr(C, packed)]
#[derive(Clone, Copy, Debug, PartialEq, Default, PointType, Pod, Zeroable)]
pub struct CloudPoint {
    #[pasture(BUILTIN_POSITION_3D)]
    pub position: Vector3<f64>,
    #[pasture(BUILTIN_COLOR_RGB)]
    pub color: Vector3<u16>,
    #[pasture(BUILTIN_INTENSITY)]
    pub intensity: u16,
}

/// Starts loading the given file on a new thread.
pub fn spawn(path: PathBuf) -> Receiver<LoadUpdate> {
    let (sender, receiver) = crossbeam_channel::bounded(2);
    thread::spawn(move || {
        let final_update = match load(&path, &sender) {
            Ok(()) => LoadUpdate::Done,
            Err(e) => LoadUpdate::Failed(e),
        };
        // the send fails if the viewer hung up - nobody cares about the
        // result in that case
        sender.send(final_update).ok();
    });
    receiver
}

fn load(path: &Path, sender: &Sender<LoadUpdate>) -> Result<()> {
    match path.extension().and_then(OsStr::to_str) {
        Some("las") | Some("laz") => load_las(path, sender),
        _ => {
            let file = File::open(path)
                .with_context(|| format!("Could not open `{}`.", path.display()))?;
            load_ply(BufReader::new(file), sender)
        }
    }
}

/// Accumulates points and sends them off as [LoadUpdate::Progress] chunks.
struct ChunkSender<'a> {
    sender: &'a Sender<LoadUpdate>,
    chunk: Vec<CloudPoint>,
    loaded: usize,
    total: usize,
    has_colors: bool,

    /// Set, when the receiving side hung up - the remaining file is skipped.
    disconnected: bool,
}

impl<'a> ChunkSender<'a> {
    fn new(sender: &'a Sender<LoadUpdate>, total: usize, has_colors: bool) -> Self {
        ChunkSender {
            sender,
            chunk: Vec::with_capacity(CHUNK_SIZE),
            loaded: 0,
            total,
            has_colors,
            disconnected: false,
        }
    }

    fn push(&mut self, point: CloudPoint) {
        self.chunk.push(point);
        if self.chunk.len() >= CHUNK_SIZE {
            self.flush();
        }
    }

    fn flush(&mut self) {
        if self.chunk.is_empty() || self.disconnected {
            return;
        }
        self.loaded += self.chunk.len();
        let points: VectorBuffer = self.chunk.drain(..).collect();
        let update = LoadUpdate::Progress {
            points,
            loaded: self.loaded,
            total: self.total,
            has_colors: self.has_colors,
        };
        if self.sender.send(update).is_err() {
            self.disconnected = true;
        }
    }
}

fn load_ply(mut reader: impl BufRead, sender: &Sender<LoadUpdate>) -> Result<()> {
    let parser = Parser::<PlyVertex>::new();
    let header = parser
        .read_header(&mut reader)
        .context("Could not read the PLY header.")?;

    let vertex_element = header
        .elements
        .get("vertex")
        .context("The PLY file has no 'vertex' element.")?;
    for required in ["x", "y", "z"] {
        if !vertex_element.properties.contains_key(required) {
            bail!("The 'vertex' element has no '{}' property.", required);
        }
    }
    let has_colors = ["red", "green", "blue"]
        .iter()
        .all(|property| vertex_element.properties.contains_key(*property));

    let mut chunks = ChunkSender::new(sender, vertex_element.count, has_colors);
    let mut line = String::new();
    for _ in 0..vertex_element.count {
        let vertex = read_ply_vertex(&parser, &mut reader, &header.encoding, vertex_element, &mut line)?;
        chunks.push(vertex.to_point());
        if chunks.disconnected {
            return Ok(());
        }
    }
    chunks.flush();
    Ok(())
}

fn read_ply_vertex(
    parser: &Parser<PlyVertex>,
    reader: &mut impl BufRead,
    encoding: &Encoding,
    element: &ElementDef,
    line: &mut String,
) -> Result<PlyVertex> {
    let vertex = match encoding {
        Encoding::Ascii => {
            line.clear();
            reader.read_line(line)?;
            parser.read_ascii_element(line, element)?
        }
        Encoding::BinaryBigEndian => parser.read_big_endian_element(reader, element)?,
        Encoding::BinaryLittleEndian => parser.read_little_endian_element(reader, element)?,
    };
    Ok(vertex)
}

fn load_las(path: &Path, sender: &Sender<LoadUpdate>) -> Result<()> {
    let mut reader = las::Reader::from_path(path)
        .with_context(|| format!("Could not open `{}`.", path.display()))?;
    let total = reader.header().number_of_points() as usize;
    let has_colors = reader.header().point_format().has_color;

    let mut chunks = ChunkSender::new(sender, total, has_colors);
    for point in reader.points() {
        let point = point.context("Could not read a point record.")?;
        let color = point
            .color
            .map(|c| Vector3::new(c.red, c.green, c.blue))
            .unwrap_or_else(Vector3::zeros);
        chunks.push(CloudPoint {
            position: Vector3::new(point.x, point.y, point.z),
            color,
            intensity: point.intensity,
        });
        if chunks.disconnected {
            return Ok(());
        }
    }
    chunks.flush();
    Ok(())
}

/// One vertex, as it comes out of the PLY parser.
#[derive(Debug, Default)]
struct PlyVertex {
    x: f64,
    y: f64,
    z: f64,
    red: u16,
    green: u16,
    blue: u16,
}

/// Spreads an 8 bit color channel over the full 16 bit range.
fn widen_color(channel: u8) -> u16 {
    channel as u16 * 257
}

impl PlyVertex {
    fn to_point(&self) -> CloudPoint {
        CloudPoint {
            position: Vector3::new(self.x, self.y, self.z),
            color: Vector3::new(self.red, self.green, self.blue),
            intensity: 0,
        }
    }
}

impl PropertyAccess for PlyVertex {
    fn new() -> Self {
        Default::default()
    }

    fn set_property(&mut self, key: String, property: Property) {
        match (key.as_ref(), property) {
            ("x", Property::Float(v)) => self.x = v as f64,
            ("x", Property::Double(v)) => self.x = v,
            ("y", Property::Float(v)) => self.y = v as f64,
            ("y", Property::Double(v)) => self.y = v,
            ("z", Property::Float(v)) => self.z = v as f64,
            ("z", Property::Double(v)) => self.z = v,
            ("red", Property::UChar(v)) => self.red = widen_color(v),
            ("red", Property::UShort(v)) => self.red = v,
            ("green", Property::UChar(v)) => self.green = widen_color(v),
            ("green", Property::UShort(v)) => self.green = v,
            ("blue", Property::UChar(v)) => self.blue = widen_color(v),
            ("blue", Property::UShort(v)) => self.blue = v,
            _ => (),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pasture_core::containers::{BorrowedBuffer, BorrowedBufferExt};
    use pasture_core::layout::attributes::{COLOR_RGB, POSITION_3D};
    use std::io::Cursor;

    fn collect_updates(ply: &str) -> (Result<()>, Vec<LoadUpdate>) {
        let (sender, receiver) = crossbeam_channel::unbounded();
        let result = load_ply(Cursor::new(ply.as_bytes()), &sender);
        drop(sender);
        (result, receiver.into_iter().collect())
    }

    #[test]
    fn ascii_ply_with_colors() {
        let ply = "ply\n\
                   format ascii 1.0\n\
                   element vertex 2\n\
                   property float x\n\
                   property float y\n\
                   property float z\n\
                   property uchar red\n\
                   property uchar green\n\
                   property uchar blue\n\
                   end_header\n\
                   0 0 0 255 0 0\n\
                   1 2 3 0 255 0\n";
        let (result, updates) = collect_updates(ply);
        result.unwrap();
        assert_eq!(updates.len(), 1);

        let (points, loaded, total, has_colors) = match &updates[0] {
            LoadUpdate::Progress {
                points,
                loaded,
                total,
                has_colors,
            } => (points, *loaded, *total, *has_colors),
            _ => panic!("expected a progress update"),
        };
        assert_eq!(loaded, 2);
        assert_eq!(total, 2);
        assert!(has_colors);
        assert_eq!(points.len(), 2);

        let positions = points
            .view_attribute::<Vector3<f64>>(&POSITION_3D)
            .into_iter()
            .collect::<Vec<_>>();
        assert_eq!(positions[0], Vector3::new(0.0, 0.0, 0.0));
        assert_eq!(positions[1], Vector3::new(1.0, 2.0, 3.0));

        let colors = points
            .view_attribute::<Vector3<u16>>(&COLOR_RGB)
            .into_iter()
            .collect::<Vec<_>>();
        assert_eq!(colors[0], Vector3::new(u16::MAX, 0, 0));
        assert_eq!(colors[1], Vector3::new(0, u16::MAX, 0));
    }

    #[test]
    fn ascii_ply_without_colors() {
        let ply = "ply\n\
                   format ascii 1.0\n\
                   element vertex 1\n\
                   property float x\n\
                   property float y\n\
                   property float z\n\
                   end_header\n\
                   0.5 -1.5 2.25\n";
        let (result, updates) = collect_updates(ply);
        result.unwrap();
        assert_eq!(updates.len(), 1);
        match &updates[0] {
            LoadUpdate::Progress {
                points, has_colors, ..
            } => {
                assert!(!has_colors);
                let positions = points
                    .view_attribute::<Vector3<f64>>(&POSITION_3D)
                    .into_iter()
                    .collect::<Vec<_>>();
                assert_eq!(positions, vec![Vector3::new(0.5, -1.5, 2.25)]);
            }
            _ => panic!("expected a progress update"),
        }
    }

    #[test]
    fn ply_without_positions_is_rejected() {
        let ply = "ply\n\
                   format ascii 1.0\n\
                   element vertex 1\n\
                   property float x\n\
                   property float y\n\
                   end_header\n\
                   0 0\n";
        let (result, updates) = collect_updates(ply);
        assert!(result.is_err());
        assert!(updates.is_empty());
    }

    #[test]
    fn ply_without_a_vertex_element_is_rejected() {
        let ply = "ply\n\
                   format ascii 1.0\n\
                   element face 0\n\
                   property list uchar int vertex_indices\n\
                   end_header\n";
        let (result, _) = collect_updates(ply);
        assert!(result.is_err());
    }

    #[test]
    fn garbage_input_is_rejected() {
        let (result, updates) = collect_updates("this is not a ply file\n");
        assert!(result.is_err());
        assert!(updates.is_empty());
    }

    #[test]
    fn color_channels_widen_to_the_full_range() {
        assert_eq!(widen_color(0), 0);
        assert_eq!(widen_color(255), u16::MAX);
        assert_eq!(widen_color(128), 128 * 257);
    }
}
