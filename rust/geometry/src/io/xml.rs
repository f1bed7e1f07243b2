// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! XML format
//!
//! ```xml
//! <Polygon2D version="1" sameDirEdgeLegal="false" force64Bit="false" data="null">
//!   <Contour data="null">
//!     <Vertex x="0" y="0" arc="0" data="null" edgeData="null"/>
//!   </Contour>
//! </Polygon2D>
//! ```
//!
//! Polylines carry a `closed` attribute and list their vertices directly.
//! User data is stored as JSON inside attributes.

use super::{check_version, ensure_regular, ObjectKind, FORMAT_VERSION};
use crate::error::{Error, Result};
use crate::flags::PolyFlags;
use crate::irregular::IrregularPolygon2D;
use crate::kernel::store::{Node, PolygonStore, PolylineStore};
use crate::polygon::Polygon2D;
use crate::polyline::Polyline2D;
use crate::user_data::UserData;
use polyform_core::Point2;
use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};
use rustc_hash::FxHashMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::{BufRead, BufReader, Read, Write};

fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(|e| Error::Serialization(e.to_string()))
}

fn from_json<T: DeserializeOwned>(text: &str) -> Result<T> {
    serde_json::from_str(text).map_err(|e| Error::Serialization(e.to_string()))
}

fn parse_f64(text: &str) -> Result<f64> {
    let value: f64 = fast_float::parse(text.trim())
        .map_err(|_| Error::Serialization(format!("invalid number {:?}", text)))?;
    if !value.is_finite() {
        return Err(Error::Serialization(format!("non-finite number {:?}", text)));
    }
    Ok(value)
}

fn parse_bool(text: &str) -> Result<bool> {
    match text {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        other => Err(Error::Serialization(format!("invalid boolean {:?}", other))),
    }
}

// ============================================================================
// Writing
// ============================================================================

struct XmlOut<W: Write> {
    writer: Writer<W>,
}

impl<W: Write> XmlOut<W> {
    fn new(inner: W) -> Self {
        Self {
            writer: Writer::new_with_indent(inner, b' ', 2),
        }
    }

    fn root(&mut self, kind: ObjectKind, flags: PolyFlags, data: &str, closed: Option<bool>) -> Result<()> {
        let version = FORMAT_VERSION.to_string();
        let mut elem = BytesStart::new(kind.element());
        elem.push_attribute(("version", version.as_str()));
        elem.push_attribute(("sameDirEdgeLegal", bool_attr(flags.same_dir_edge_legal)));
        elem.push_attribute(("force64Bit", bool_attr(flags.force_64bit_precision)));
        if let Some(closed) = closed {
            elem.push_attribute(("closed", bool_attr(closed)));
        }
        elem.push_attribute(("data", data));
        self.writer.write_event(Event::Start(elem))?;
        Ok(())
    }

    fn open(&mut self, name: &str, data: &str) -> Result<()> {
        let mut elem = BytesStart::new(name);
        elem.push_attribute(("data", data));
        self.writer.write_event(Event::Start(elem))?;
        Ok(())
    }

    fn close(&mut self, name: &str) -> Result<()> {
        self.writer.write_event(Event::End(BytesEnd::new(name)))?;
        Ok(())
    }

    fn vertices<V: UserData, E: UserData>(&mut self, nodes: &[Node<V, E>]) -> Result<()> {
        for node in nodes {
            let (x, y, arc) = (node.point.x.to_string(), node.point.y.to_string(), node.arc_angle.to_string());
            let (data, edge_data) = (to_json(&node.data)?, to_json(&node.edge_data)?);
            let mut elem = BytesStart::new("Vertex");
            elem.push_attribute(("x", x.as_str()));
            elem.push_attribute(("y", y.as_str()));
            elem.push_attribute(("arc", arc.as_str()));
            elem.push_attribute(("data", data.as_str()));
            elem.push_attribute(("edgeData", edge_data.as_str()));
            self.writer.write_event(Event::Empty(elem))?;
        }
        Ok(())
    }
}

fn bool_attr(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

fn write_polygon<W, V, E, C, P>(w: W, kind: ObjectKind, store: &PolygonStore<V, E, C, P>) -> Result<()>
where
    W: Write,
    V: UserData,
    E: UserData,
    C: UserData,
    P: UserData,
{
    let mut out = XmlOut::new(w);
    out.root(kind, store.flags, &to_json(&store.data)?, None)?;
    for (c, contour) in store.contours.iter().enumerate() {
        out.open("Contour", &to_json(&contour.data)?)?;
        out.vertices(store.ring(c))?;
        out.close("Contour")?;
    }
    out.close(kind.element())
}

// ============================================================================
// Reading
// ============================================================================

/// Attribute map of one element
struct Attrs {
    element: String,
    values: FxHashMap<String, String>,
}

impl Attrs {
    fn from_start(start: &BytesStart<'_>) -> Result<Self> {
        let element = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let mut values = FxHashMap::default();
        for attr in start.attributes() {
            let attr = attr?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            values.insert(key, attr.unescape_value()?.into_owned());
        }
        Ok(Self { element, values })
    }

    fn get(&self, key: &str) -> Result<&str> {
        self.values
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| Error::Serialization(format!("<{}> lacks attribute {:?}", self.element, key)))
    }

    fn flag(&self, key: &str) -> Result<bool> {
        self.values.get(key).map_or(Ok(false), |v| parse_bool(v))
    }

    fn node<V: UserData, E: UserData>(&self) -> Result<Node<V, E>> {
        let point = Point2::new(parse_f64(self.get("x")?)?, parse_f64(self.get("y")?)?);
        let arc = match self.values.get("arc") {
            Some(v) => parse_f64(v)?,
            None => 0.0,
        };
        let data = self.values.get("data").map_or(Ok(V::default()), |v| from_json(v))?;
        let edge_data = self.values.get("edgeData").map_or(Ok(E::default()), |v| from_json(v))?;
        Ok(Node::new(point, data, arc, edge_data))
    }
}

/// Parsed document before it is turned into storage
struct Document {
    root: Attrs,
    /// Contour attributes and vertices; polylines use one unnamed contour
    contours: Vec<(Option<Attrs>, Vec<Attrs>)>,
}

impl Document {
    fn read<R: BufRead>(input: R, kind: ObjectKind) -> Result<Self> {
        let mut reader = Reader::from_reader(input);
        reader.trim_text(true);
        let mut buf = Vec::new();
        let mut root: Option<Attrs> = None;
        let mut contours: Vec<(Option<Attrs>, Vec<Attrs>)> = Vec::new();
        let mut in_contour = false;
        let mut finished = false;

        while !finished {
            buf.clear();
            let event = reader.read_event_into(&mut buf)?;
            let (start, empty) = match event {
                Event::Start(start) => (Some(start.into_owned()), false),
                Event::Empty(start) => (Some(start.into_owned()), true),
                Event::End(end) => {
                    match end.name().as_ref() {
                        b"Contour" => in_contour = false,
                        name if name == kind.element().as_bytes() => finished = true,
                        _ => {}
                    }
                    (None, false)
                }
                Event::Eof => break,
                _ => (None, false),
            };
            let Some(start) = start else { continue };
            let attrs = Attrs::from_start(&start)?;
            match (attrs.element.as_str(), root.is_some()) {
                (name, false) if name == kind.element() => {
                    check_version(parse_f64(attrs.get("version")?)? as u16)?;
                    root = Some(attrs);
                    finished = empty;
                }
                (_, false) => {
                    return Err(Error::Serialization(format!(
                        "expected <{}>, found <{}>",
                        kind.element(),
                        attrs.element
                    )));
                }
                ("Contour", true) if kind != ObjectKind::Polyline => {
                    contours.push((Some(attrs), Vec::new()));
                    in_contour = !empty;
                }
                ("Vertex", true) => {
                    if kind == ObjectKind::Polyline {
                        if contours.is_empty() {
                            contours.push((None, Vec::new()));
                        }
                    } else if !in_contour {
                        return Err(Error::Serialization("<Vertex> outside <Contour>".into()));
                    }
                    if let Some((_, vertices)) = contours.last_mut() {
                        vertices.push(attrs);
                    }
                }
                (other, true) => {
                    return Err(Error::Serialization(format!("unexpected <{}>", other)));
                }
            }
        }
        let root = root.ok_or_else(|| Error::Serialization(format!("missing <{}>", kind.element())))?;
        if !finished {
            return Err(Error::Serialization(format!("unterminated <{}>", kind.element())));
        }
        Ok(Self { root, contours })
    }

    fn flags(&self) -> Result<PolyFlags> {
        Ok(PolyFlags {
            same_dir_edge_legal: self.root.flag("sameDirEdgeLegal")?,
            force_64bit_precision: self.root.flag("force64Bit")?,
        })
    }

    fn data<T: UserData>(attrs: Option<&Attrs>) -> Result<T> {
        match attrs.and_then(|a| a.values.get("data")) {
            Some(text) => from_json(text),
            None => Ok(T::default()),
        }
    }

    fn polygon<V, E, C, P>(&self) -> Result<PolygonStore<V, E, C, P>>
    where
        V: UserData,
        E: UserData,
        C: UserData,
        P: UserData,
    {
        let mut store = PolygonStore::empty(self.flags()?);
        for (attrs, vertices) in &self.contours {
            let ring = vertices.iter().map(Attrs::node).collect::<Result<Vec<_>>>()?;
            store.push_ring(ring, Self::data(attrs.as_ref())?);
        }
        store.data = Self::data(Some(&self.root))?;
        Ok(store)
    }

    fn polyline<V, E, P>(&self) -> Result<PolylineStore<V, E, P>>
    where
        V: UserData,
        E: UserData,
        P: UserData,
    {
        let mut store = PolylineStore::empty(self.flags()?);
        store.closed = self.root.flag("closed")?;
        if let Some((_, vertices)) = self.contours.first() {
            store.nodes = vertices.iter().map(Attrs::node).collect::<Result<Vec<_>>>()?;
        }
        store.data = Self::data(Some(&self.root))?;
        Ok(store)
    }
}

impl<V, E, C, P> IrregularPolygon2D<V, E, C, P>
where
    V: UserData,
    E: UserData,
    C: UserData,
    P: UserData,
{
    pub fn write_xml<W: Write>(&self, w: W) -> Result<()> {
        write_polygon(w, ObjectKind::Irregular, self.store())
    }

    pub fn read_xml<R: Read>(r: R) -> Result<Self> {
        let doc = Document::read(BufReader::new(r), ObjectKind::Irregular)?;
        Ok(Self::from_store(doc.polygon()?))
    }
}

impl<V, E, C, P> Polygon2D<V, E, C, P>
where
    V: UserData,
    E: UserData,
    C: UserData,
    P: UserData,
{
    pub fn write_xml<W: Write>(&self, w: W) -> Result<()> {
        write_polygon(w, ObjectKind::Polygon, self.store())
    }

    /// Fails with `RegularizationFailed` when the stored geometry is not
    /// regular
    pub fn read_xml<R: Read>(r: R) -> Result<Self> {
        let doc = Document::read(BufReader::new(r), ObjectKind::Polygon)?;
        let store = doc.polygon()?;
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
    pub fn write_xml<W: Write>(&self, w: W) -> Result<()> {
        let store = self.store();
        let mut out = XmlOut::new(w);
        out.root(ObjectKind::Polyline, store.flags, &to_json(&store.data)?, Some(store.closed))?;
        out.vertices(&store.nodes)?;
        out.close(ObjectKind::Polyline.element())
    }

    pub fn read_xml<R: Read>(r: R) -> Result<Self> {
        let doc = Document::read(BufReader::new(r), ObjectKind::Polyline)?;
        Ok(Self::from_store(doc.polyline()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::{Boundary, PolyCreateFlags};
    use crate::irregular::ContourDescription;
    use approx::assert_relative_eq;
    use polyform_core::Box2D;

    fn holed() -> Polygon2D<i32, String, (), String> {
        let outer: Polygon2D<i32, String, (), String> =
            Polygon2D::from_box(&Box2D::new(Point2::new(0.0, 0.0), Point2::new(10.0, 10.0)), PolyFlags::default());
        let hole = Polygon2D::from_box(&Box2D::new(Point2::new(3.0, 3.0), Point2::new(7.0, 7.0)), PolyFlags::default());
        let mut out = outer.substract(&hole, Boundary::Closed).pop_largest().unwrap();
        let v = out.vertices().next().unwrap();
        out.set_vertex_data(v, -7).unwrap();
        let e = out.edges().nth(1).unwrap();
        out.set_edge_data(e, "a \"quoted\" <edge>".to_string()).unwrap();
        out.set_polygon_data("slab".to_string());
        out
    }

    #[test]
    fn test_polygon_round_trip() {
        let poly = holed();
        let mut text = Vec::new();
        poly.write_xml(&mut text).unwrap();
        let xml = String::from_utf8(text.clone()).unwrap();
        assert!(xml.starts_with("<Polygon2D version=\"1\""));
        assert_eq!(xml.matches("<Contour").count(), 2);
        let back = Polygon2D::read_xml(text.as_slice()).unwrap();
        assert_eq!(back, poly);
        assert_relative_eq!(back.signed_area(), 84.0, epsilon = 1e-12);
    }

    #[test]
    fn test_irregular_round_trip_with_arcs() {
        let poly: IrregularPolygon2D<(), (), u8, ()> = IrregularPolygon2D::from_contours(
            &[ContourDescription::with_arcs(
                vec![Point2::new(0.0, 0.0), Point2::new(1.0, 0.0), Point2::new(1.0, 1.0)],
                vec![0.1, -0.3, 0.0],
            )],
            PolyCreateFlags::FORCE_64BIT_PRECISION,
        )
        .unwrap()
        .with_user_data(&[], &[], &[42], ())
        .unwrap();
        let mut text = Vec::new();
        poly.write_xml(&mut text).unwrap();
        let back = IrregularPolygon2D::read_xml(text.as_slice()).unwrap();
        assert_eq!(back, poly);
        assert!(back.flags().force_64bit_precision);
    }

    #[test]
    fn test_polyline_round_trip() {
        let line: Polyline2D<(), (), Vec<u16>> = Polyline2D::from_points(
            &[Point2::new(0.5, 0.25), Point2::new(1.0 / 3.0, 2.0)],
            false,
        )
        .unwrap();
        let mut text = Vec::new();
        line.write_xml(&mut text).unwrap();
        let back = Polyline2D::read_xml(text.as_slice()).unwrap();
        assert_eq!(back, line);
        assert!(!back.is_closed());
    }

    #[test]
    fn test_rejects_malformed_documents() {
        let wrong_root = r#"<Polyline2D version="1" closed="false" data="null"></Polyline2D>"#;
        assert!(Polygon2D::<(), (), (), ()>::read_xml(wrong_root.as_bytes()).is_err());

        let future = r#"<Polygon2D version="7" data="null"></Polygon2D>"#;
        assert!(matches!(
            Polygon2D::<(), (), (), ()>::read_xml(future.as_bytes()),
            Err(Error::Serialization(_))
        ));

        let bad_number = r#"<IrregularPolygon2D version="1" data="null">
            <Contour data="null"><Vertex x="zero" y="0"/></Contour>
        </IrregularPolygon2D>"#;
        assert!(IrregularPolygon2D::<(), (), (), ()>::read_xml(bad_number.as_bytes()).is_err());

        let unterminated = r#"<IrregularPolygon2D version="1" data="null"><Contour data="null">"#;
        assert!(IrregularPolygon2D::<(), (), (), ()>::read_xml(unterminated.as_bytes()).is_err());
    }

    #[test]
    fn test_missing_optional_attributes_default() {
        let doc = r#"<IrregularPolygon2D version="1">
            <Contour>
                <Vertex x="0" y="0"/><Vertex x="2" y="0"/><Vertex x="2" y="2"/>
            </Contour>
        </IrregularPolygon2D>"#;
        let poly = IrregularPolygon2D::<(), (), (), ()>::read_xml(doc.as_bytes()).unwrap();
        assert_eq!(poly.vertex_count(), 3);
        assert!(!poly.flags().same_dir_edge_legal);
        assert_relative_eq!(poly.signed_area(), 2.0, epsilon = 1e-12);
    }
}
