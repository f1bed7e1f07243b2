// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Little-endian binary format
//!
//! ```text
//! magic "PFG2" | kind u8 | version u16 | flags u8
//! polygon:  contours u32, then per contour: vertices u32, data blob,
//!           then per vertex: x f64, y f64, arc f64, vertex blob, edge blob
//! polyline: closed u8, vertices u32, then the vertices as above
//! trailer:  polygon or polyline data blob
//! ```
//!
//! A blob is a u32 byte length followed by MessagePack bytes.

use super::{check_version, ensure_regular, ObjectKind, FORMAT_VERSION};
use crate::error::{Error, Result};
use crate::flags::PolyFlags;
use crate::irregular::IrregularPolygon2D;
use crate::kernel::store::{Node, PolygonStore, PolylineStore};
use crate::polygon::Polygon2D;
use crate::polyline::Polyline2D;
use crate::user_data::UserData;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use polyform_core::Point2;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::{Read, Write};

const MAGIC: &[u8; 4] = b"PFG2";

/// Upper bound for a single blob or element count
const MAX_LEN: u32 = 1 << 28;

fn write_blob<W: Write, T: Serialize>(w: &mut W, value: &T) -> Result<()> {
    let bytes = rmp_serde::to_vec(value).map_err(|e| Error::Serialization(e.to_string()))?;
    let len = u32::try_from(bytes.len()).map_err(|_| Error::Serialization("user data too large".into()))?;
    w.write_u32::<LittleEndian>(len)?;
    w.write_all(&bytes)?;
    Ok(())
}

fn read_len<R: Read>(r: &mut R) -> Result<usize> {
    let len = r.read_u32::<LittleEndian>()?;
    if len > MAX_LEN {
        return Err(Error::Serialization(format!("length {} exceeds the format limit", len)));
    }
    Ok(len as usize)
}

fn read_blob<R: Read, T: DeserializeOwned>(r: &mut R) -> Result<T> {
    let len = read_len(r)?;
    let mut bytes = vec![0u8; len];
    r.read_exact(&mut bytes)?;
    rmp_serde::from_slice(&bytes).map_err(|e| Error::Serialization(e.to_string()))
}

fn write_count<W: Write>(w: &mut W, n: usize) -> Result<()> {
    let n = u32::try_from(n).map_err(|_| Error::Serialization("element count too large".into()))?;
    w.write_u32::<LittleEndian>(n)?;
    Ok(())
}

fn write_header<W: Write>(w: &mut W, kind: ObjectKind, flags: PolyFlags) -> Result<()> {
    w.write_all(MAGIC)?;
    w.write_u8(kind as u8)?;
    w.write_u16::<LittleEndian>(FORMAT_VERSION)?;
    w.write_u8(flags.to_bits())?;
    Ok(())
}

fn read_header<R: Read>(r: &mut R, expected: ObjectKind) -> Result<PolyFlags> {
    let mut magic = [0u8; 4];
    r.read_exact(&mut magic)?;
    if &magic != MAGIC {
        return Err(Error::Serialization("not a polygon stream".into()));
    }
    let kind = ObjectKind::from_tag(r.read_u8()?)?;
    if kind != expected {
        return Err(Error::Serialization(format!(
            "stream holds {}, expected {}",
            kind.element(),
            expected.element()
        )));
    }
    check_version(r.read_u16::<LittleEndian>()?)?;
    Ok(PolyFlags::from_bits(r.read_u8()?))
}

fn write_nodes<W: Write, V: UserData, E: UserData>(w: &mut W, nodes: &[Node<V, E>]) -> Result<()> {
    for node in nodes {
        w.write_f64::<LittleEndian>(node.point.x)?;
        w.write_f64::<LittleEndian>(node.point.y)?;
        w.write_f64::<LittleEndian>(node.arc_angle)?;
        write_blob(w, &node.data)?;
        write_blob(w, &node.edge_data)?;
    }
    Ok(())
}

fn read_nodes<R: Read, V: UserData, E: UserData>(r: &mut R, count: usize) -> Result<Vec<Node<V, E>>> {
    let mut nodes = Vec::with_capacity(count.min(4096));
    for _ in 0..count {
        let x = r.read_f64::<LittleEndian>()?;
        let y = r.read_f64::<LittleEndian>()?;
        let arc = r.read_f64::<LittleEndian>()?;
        if !(x.is_finite() && y.is_finite() && arc.is_finite()) {
            return Err(Error::Serialization("non-finite coordinate".into()));
        }
        let data = read_blob(r)?;
        let edge_data = read_blob(r)?;
        nodes.push(Node::new(Point2::new(x, y), data, arc, edge_data));
    }
    Ok(nodes)
}

fn write_polygon<W, V, E, C, P>(w: &mut W, kind: ObjectKind, store: &PolygonStore<V, E, C, P>) -> Result<()>
where
    W: Write,
    V: UserData,
    E: UserData,
    C: UserData,
    P: UserData,
{
    write_header(w, kind, store.flags)?;
    write_count(w, store.contour_count())?;
    for (c, contour) in store.contours.iter().enumerate() {
        let ring = store.ring(c);
        write_count(w, ring.len())?;
        write_blob(w, &contour.data)?;
        write_nodes(w, ring)?;
    }
    write_blob(w, &store.data)
}

fn read_polygon<R, V, E, C, P>(r: &mut R, kind: ObjectKind) -> Result<PolygonStore<V, E, C, P>>
where
    R: Read,
    V: UserData,
    E: UserData,
    C: UserData,
    P: UserData,
{
    let flags = read_header(r, kind)?;
    let mut store = PolygonStore::empty(flags);
    let contours = read_len(r)?;
    for _ in 0..contours {
        let count = read_len(r)?;
        let data: C = read_blob(r)?;
        let ring = read_nodes(r, count)?;
        store.push_ring(ring, data);
    }
    store.data = read_blob(r)?;
    Ok(store)
}

impl<V, E, C, P> IrregularPolygon2D<V, E, C, P>
where
    V: UserData,
    E: UserData,
    C: UserData,
    P: UserData,
{
    pub fn write_binary<W: Write>(&self, w: &mut W) -> Result<()> {
        write_polygon(w, ObjectKind::Irregular, self.store())
    }

    pub fn read_binary<R: Read>(r: &mut R) -> Result<Self> {
        Ok(Self::from_store(read_polygon(r, ObjectKind::Irregular)?))
    }
}

impl<V, E, C, P> Polygon2D<V, E, C, P>
where
    V: UserData,
    E: UserData,
    C: UserData,
    P: UserData,
{
    pub fn write_binary<W: Write>(&self, w: &mut W) -> Result<()> {
        write_polygon(w, ObjectKind::Polygon, self.store())
    }

    /// Fails with `RegularizationFailed` when the stored geometry is not
    /// regular
    pub fn read_binary<R: Read>(r: &mut R) -> Result<Self> {
        let store = read_polygon(r, ObjectKind::Polygon)?;
        ensure_regular(&store)?;
        Ok(Self::from_store(store))
    }
}

impl<V, E, P> Polyline2D<V, E, P>
where
    V: UserData,
    E: UserData,
    P: UserData,
{
    pub fn write_binary<W: Write>(&self, w: &mut W) -> Result<()> {
        let store = self.store();
        write_header(w, ObjectKind::Polyline, store.flags)?;
        w.write_u8(u8::from(store.closed))?;
        write_count(w, store.nodes.len())?;
        write_nodes(w, &store.nodes)?;
        write_blob(w, &store.data)
    }

    pub fn read_binary<R: Read>(r: &mut R) -> Result<Self> {
        let flags = read_header(r, ObjectKind::Polyline)?;
        let mut store = PolylineStore::empty(flags);
        store.closed = r.read_u8()? != 0;
        let count = read_len(r)?;
        store.nodes = read_nodes(r, count)?;
        store.data = read_blob(r)?;
        Ok(Self::from_store(store))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::PolyCreateFlags;
    use crate::irregular::ContourDescription;
    use serde::Deserialize;
    use std::io::Cursor;

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    struct Tag {
        name: String,
        weight: u32,
    }

    fn tagged() -> IrregularPolygon2D<u32, Tag, String, Option<i64>> {
        let outer = ContourDescription::with_arcs(
            vec![Point2::new(0.0, 0.0), Point2::new(10.0, 0.0), Point2::new(10.0, 10.0), Point2::new(0.0, 10.0)],
            vec![0.0, 0.5, 0.0, 0.0],
        );
        let hole = ContourDescription::new(vec![
            Point2::new(3.0, 3.0),
            Point2::new(3.0, 7.0),
            Point2::new(7.0, 7.0),
            Point2::new(7.0, 3.0),
        ]);
        let tag = |i: u32| Tag {
            name: format!("edge-{}", i),
            weight: i,
        };
        IrregularPolygon2D::from_contours(&[outer, hole], PolyCreateFlags::SAME_DIR_EDGE_LEGAL_AND_KEEP)
            .unwrap()
            .with_user_data(
                &[1, 2, 3, 4, 5, 6, 7, 8],
                &(0..8).map(tag).collect::<Vec<_>>(),
                &["outer".to_string(), "hole".to_string()],
                Some(-3),
            )
            .unwrap()
    }

    #[test]
    fn test_irregular_round_trip() {
        let poly = tagged();
        let mut bytes = Vec::new();
        poly.write_binary(&mut bytes).unwrap();
        assert_eq!(&bytes[..4], MAGIC);
        let back = IrregularPolygon2D::read_binary(&mut Cursor::new(&bytes)).unwrap();
        assert_eq!(back, poly);
        assert!(back.flags().same_dir_edge_legal);
        assert!(!back.shares_storage_with(&poly));
    }

    #[test]
    fn test_polygon_round_trip_checks_regularity() {
        let regular = tagged().regularize().pop_largest().unwrap();
        let mut bytes = Vec::new();
        regular.write_binary(&mut bytes).unwrap();
        let back = Polygon2D::read_binary(&mut Cursor::new(&bytes)).unwrap();
        assert_eq!(back, regular);

        // a hole running the same way as its outer contour is not regular
        let same_turn: IrregularPolygon2D<u32, Tag, String, Option<i64>> = IrregularPolygon2D::from_contours(
            &[
                ContourDescription::new(vec![Point2::new(0.0, 0.0), Point2::new(10.0, 0.0), Point2::new(10.0, 10.0), Point2::new(0.0, 10.0)]),
                ContourDescription::new(vec![Point2::new(3.0, 3.0), Point2::new(7.0, 3.0), Point2::new(7.0, 7.0), Point2::new(3.0, 7.0)]),
            ],
            PolyCreateFlags::NONE,
        )
        .unwrap();
        let mut bytes = Vec::new();
        same_turn.write_binary(&mut bytes).unwrap();
        bytes[4] = ObjectKind::Polygon as u8;
        let err = Polygon2D::<u32, Tag, String, Option<i64>>::read_binary(&mut Cursor::new(&bytes)).unwrap_err();
        assert!(matches!(err, Error::RegularizationFailed(_)));
    }

    #[test]
    fn test_polyline_round_trip() {
        let line: Polyline2D<(), (), String> = Polyline2D::from_points(
            &[Point2::new(0.0, 0.0), Point2::new(1.0, 2.0), Point2::new(3.0, 1.0)],
            true,
        )
        .unwrap();
        let mut bytes = Vec::new();
        line.write_binary(&mut bytes).unwrap();
        let back = Polyline2D::read_binary(&mut Cursor::new(&bytes)).unwrap();
        assert_eq!(back, line);
        assert!(back.is_closed());
    }

    #[test]
    fn test_rejects_bad_headers() {
        let line: Polyline2D = Polyline2D::from_points(&[Point2::new(0.0, 0.0), Point2::new(1.0, 0.0)], false).unwrap();
        let mut bytes = Vec::new();
        line.write_binary(&mut bytes).unwrap();

        let err = IrregularPolygon2D::<(), (), (), ()>::read_binary(&mut Cursor::new(&bytes)).unwrap_err();
        assert!(matches!(err, Error::Serialization(_)));

        let mut future = bytes.clone();
        future[5] = 9;
        assert!(Polyline2D::<(), (), ()>::read_binary(&mut Cursor::new(&future)).is_err());

        let truncated = &bytes[..bytes.len() - 3];
        assert!(matches!(
            Polyline2D::<(), (), ()>::read_binary(&mut Cursor::new(truncated)),
            Err(Error::Io(_))
        ));
    }
}
