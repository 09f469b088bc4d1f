//! Streaming extraction of coordinate data from GPX and KML documents.
//!
//! Elements are matched on their local (namespace-stripped) tag names, so
//! namespaced documents parse the same as plain ones. Extraction is a
//! single forward pass over the input; nothing is validated beyond the
//! fields the pipeline needs.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use time::PrimitiveDateTime;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

use crate::{ParseError, Track, TrackPoint};

/// Naive timestamp pattern applied to the first 19 characters of a `time`
/// child. Any timezone suffix (trailing `Z` or offset) is truncated away;
/// the value is interpreted as if it were UTC.
const TIME_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");

/// Which GPX element kind a [`PointIter`] matches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointKind {
    /// `<trkpt>` track points.
    Trackpoint,
    /// `<wpt>` waypoints.
    Waypoint,
}

impl PointKind {
    fn tag(self) -> &'static [u8] {
        match self {
            PointKind::Trackpoint => b"trkpt",
            PointKind::Waypoint => b"wpt",
        }
    }
}

/// Read all `<trkpt>` elements of a GPX document, in document order.
pub fn read_gpx(input: &[u8]) -> Result<Track, ParseError> {
    PointIter::new(input, PointKind::Trackpoint).collect()
}

/// Read all `<wpt>` elements of a GPX document, in document order.
pub fn read_waypoints(input: &[u8]) -> Result<Track, ParseError> {
    PointIter::new(input, PointKind::Waypoint).collect()
}

/// Lazy single-pass iterator over the points of a GPX document.
///
/// Yields one `Result` per matched element; after the first error (or the
/// end of the document) the iterator is fused. Not restartable without
/// re-creating it over the source bytes.
pub struct PointIter<'a> {
    reader: Reader<&'a [u8]>,
    kind: PointKind,
    index: usize,
    done: bool,
}

impl<'a> PointIter<'a> {
    pub fn new(input: &'a [u8], kind: PointKind) -> Self {
        PointIter {
            reader: Reader::from_reader(input),
            kind,
            index: 0,
            done: false,
        }
    }

    fn xml_error(&self, source: quick_xml::Error) -> ParseError {
        ParseError::Xml {
            position: self.reader.buffer_position() as u64,
            source,
        }
    }

    /// Advance to the next matching element and assemble a point from it.
    fn read_point(&mut self) -> Result<Option<TrackPoint>, ParseError> {
        loop {
            let event = self
                .reader
                .read_event()
                .map_err(|e| self.xml_error(e))?;

            match event {
                Event::Eof => return Ok(None),
                Event::Start(ref e) if e.local_name().as_ref() == self.kind.tag() => {
                    let (lat, lon) = self.coordinates(e)?;
                    let (time, elev) = self.children()?;
                    return Ok(Some(TrackPoint {
                        time,
                        lon,
                        lat,
                        elev,
                    }));
                }
                Event::Empty(ref e) if e.local_name().as_ref() == self.kind.tag() => {
                    let (lat, lon) = self.coordinates(e)?;
                    return Ok(Some(TrackPoint {
                        time: f64::NAN,
                        lon,
                        lat,
                        elev: f64::NAN,
                    }));
                }
                _ => {}
            }
        }
    }

    /// The required `lat`/`lon` attributes of a point element.
    fn coordinates(&self, e: &BytesStart) -> Result<(f64, f64), ParseError> {
        let mut lat = None;
        let mut lon = None;

        for attr in e.attributes().flatten() {
            match attr.key.as_ref() {
                b"lat" => lat = Some(numeric(&String::from_utf8_lossy(&attr.value), self.index, "lat")?),
                b"lon" => lon = Some(numeric(&String::from_utf8_lossy(&attr.value), self.index, "lon")?),
                _ => {}
            }
        }

        let lat = lat.ok_or(ParseError::MissingAttribute {
            index: self.index,
            attr: "lat",
        })?;
        let lon = lon.ok_or(ParseError::MissingAttribute {
            index: self.index,
            attr: "lon",
        })?;
        Ok((lat, lon))
    }

    /// Scan the direct children of a point element for elevation and time,
    /// consuming events up to and including the element's closing tag.
    /// Either child is optional and defaults to NaN.
    fn children(&mut self) -> Result<(f64, f64), ParseError> {
        let mut time = f64::NAN;
        let mut elev = f64::NAN;
        let mut capture: Option<&'static str> = None;
        let mut text = String::new();
        let mut depth = 0usize;

        loop {
            let event = self
                .reader
                .read_event()
                .map_err(|e| self.xml_error(e))?;

            match event {
                Event::Start(ref e) => {
                    depth += 1;
                    if depth == 1 {
                        // Direct children only; tag-name suffix matching
                        // tolerates namespace-mangled readers.
                        let name = e.local_name();
                        capture = if name.as_ref().ends_with(b"time") {
                            text.clear();
                            Some("time")
                        } else if name.as_ref().ends_with(b"ele") {
                            text.clear();
                            Some("ele")
                        } else {
                            None
                        };
                    }
                }
                Event::End(_) => {
                    if depth == 0 {
                        // Closing tag of the point element itself.
                        return Ok((time, elev));
                    }
                    depth -= 1;
                    if depth == 0 {
                        match capture.take() {
                            Some("time") => time = self.timestamp(&text)?,
                            Some("ele") => elev = numeric(&text, self.index, "ele")?,
                            _ => {}
                        }
                    }
                }
                Event::Text(ref e) => {
                    if depth == 1 && capture.is_some() {
                        text.push_str(&e.unescape().unwrap_or_default());
                    }
                }
                Event::Eof => {
                    return Err(ParseError::Truncated { index: self.index });
                }
                _ => {}
            }
        }
    }

    /// Epoch seconds from the first 19 characters of a `time` child.
    fn timestamp(&self, text: &str) -> Result<f64, ParseError> {
        let trimmed = text.trim();
        let parsed = trimmed
            .get(..19)
            .and_then(|head| PrimitiveDateTime::parse(head, TIME_FORMAT).ok())
            .ok_or_else(|| ParseError::InvalidValue {
                index: self.index,
                field: "time",
                value: trimmed.to_string(),
            })?;
        Ok(parsed.assume_utc().unix_timestamp() as f64)
    }
}

impl Iterator for PointIter<'_> {
    type Item = Result<TrackPoint, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.read_point() {
            Ok(Some(point)) => {
                self.index += 1;
                Some(Ok(point))
            }
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Read every `<coordinates>` element of a KML document as track points.
///
/// Rows are whitespace-separated `lon,lat[,elev]` tuples; KML carries no
/// per-point timestamps, so `time` is always NaN.
pub fn read_kml(input: &[u8]) -> Result<Track, ParseError> {
    let mut reader = Reader::from_reader(input);
    let mut points = Vec::new();
    let mut in_coordinates = false;
    let mut text = String::new();

    loop {
        let event = reader.read_event().map_err(|e| ParseError::Xml {
            position: reader.buffer_position() as u64,
            source: e,
        })?;

        match event {
            Event::Eof => break,
            Event::Start(ref e) if e.local_name().as_ref() == b"coordinates" => {
                in_coordinates = true;
                text.clear();
            }
            Event::End(ref e) if e.local_name().as_ref() == b"coordinates" => {
                in_coordinates = false;
                coordinate_rows(&text, &mut points)?;
            }
            Event::Text(ref e) if in_coordinates => {
                text.push_str(&e.unescape().unwrap_or_default());
            }
            _ => {}
        }
    }

    Ok(points)
}

fn coordinate_rows(text: &str, points: &mut Vec<TrackPoint>) -> Result<(), ParseError> {
    for row in text.split_whitespace() {
        let index = points.len();
        let mut fields = row.split(',');
        let (Some(lon), Some(lat)) = (fields.next(), fields.next()) else {
            return Err(ParseError::InvalidValue {
                index,
                field: "coordinates",
                value: row.to_string(),
            });
        };
        let lon = numeric(lon, index, "lon")?;
        let lat = numeric(lat, index, "lat")?;
        let elev = match fields.next() {
            Some(raw) => numeric(raw, index, "ele")?,
            None => f64::NAN,
        };
        points.push(TrackPoint {
            time: f64::NAN,
            lon,
            lat,
            elev,
        });
    }
    Ok(())
}

fn numeric(raw: &str, index: usize, field: &'static str) -> Result<f64, ParseError> {
    raw.trim().parse().map_err(|_| ParseError::InvalidValue {
        index,
        field,
        value: raw.trim().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_GPX: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="test">
  <trk>
    <name>Test Track</name>
    <trkseg>
      <trkpt lat="37.7749" lon="-122.4194">
        <ele>100</ele>
        <time>2023-01-01T10:00:00Z</time>
        <extensions>
          <ns3:TrackPointExtension xmlns:ns3="http://www.garmin.com/xmlschemas/TrackPointExtension/v1">
            <ns3:hr>150</ns3:hr>
          </ns3:TrackPointExtension>
        </extensions>
      </trkpt>
      <trkpt lat="37.7750" lon="-122.4195">
        <ele>101</ele>
        <time>2023-01-01T10:00:02Z</time>
      </trkpt>
      <trkpt lat="37.7751" lon="-122.4196">
        <ele>102</ele>
        <time>2023-01-01T10:00:10Z</time>
      </trkpt>
    </trkseg>
  </trk>
</gpx>"#;

    // 2023-01-01T10:00:00 UTC
    const SAMPLE_EPOCH: f64 = 1672567200.0;

    #[test]
    fn test_read_gpx_extracts_all_fields() {
        let track = read_gpx(SAMPLE_GPX.as_bytes()).unwrap();
        assert_eq!(track.len(), 3);

        assert_eq!(track[0].lat, 37.7749);
        assert_eq!(track[0].lon, -122.4194);
        assert_eq!(track[0].elev, 100.0);
        assert_eq!(track[0].time, SAMPLE_EPOCH);

        assert_eq!(track[1].time, SAMPLE_EPOCH + 2.0);
        assert_eq!(track[2].time, SAMPLE_EPOCH + 10.0);
        assert_eq!(track[2].elev, 102.0);
    }

    /// The timezone suffix is truncated, so an offset timestamp parses to the
    /// same naive value as a Z-suffixed one.
    #[test]
    fn test_read_gpx_truncates_timezone_suffix() {
        let gpx = r#"<gpx><trk><trkseg>
          <trkpt lat="1.0" lon="2.0"><time>2023-01-01T10:00:00+05:00</time></trkpt>
          <trkpt lat="1.0" lon="2.0"><time>2023-01-01T10:00:00Z</time></trkpt>
        </trkseg></trk></gpx>"#;

        let track = read_gpx(gpx.as_bytes()).unwrap();
        assert_eq!(track[0].time, track[1].time);
        assert_eq!(track[0].time, SAMPLE_EPOCH);
    }

    #[test]
    fn test_read_gpx_missing_time_is_nan() {
        let gpx = r#"<gpx><trk><trkseg>
          <trkpt lat="1.0" lon="2.0"><ele>5.5</ele></trkpt>
        </trkseg></trk></gpx>"#;

        let track = read_gpx(gpx.as_bytes()).unwrap();
        assert_eq!(track.len(), 1);
        assert!(track[0].time.is_nan());
        assert_eq!(track[0].elev, 5.5);
    }

    #[test]
    fn test_read_gpx_missing_elevation_is_nan() {
        let gpx = r#"<gpx><trk><trkseg>
          <trkpt lat="1.0" lon="2.0"><time>2023-01-01T10:00:00Z</time></trkpt>
        </trkseg></trk></gpx>"#;

        let track = read_gpx(gpx.as_bytes()).unwrap();
        assert!(track[0].elev.is_nan());
        assert_eq!(track[0].time, SAMPLE_EPOCH);
    }

    #[test]
    fn test_read_gpx_missing_lat_is_an_error() {
        let gpx = r#"<gpx><trk><trkseg>
          <trkpt lat="1.0" lon="2.0"></trkpt>
          <trkpt lon="2.0"></trkpt>
        </trkseg></trk></gpx>"#;

        let err = read_gpx(gpx.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            ParseError::MissingAttribute { index: 1, attr: "lat" }
        ));
    }

    #[test]
    fn test_read_gpx_non_numeric_lon_is_an_error() {
        let gpx = r#"<gpx><trkpt lat="1.0" lon="east"></trkpt></gpx>"#;

        let err = read_gpx(gpx.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            ParseError::InvalidValue { index: 0, field: "lon", .. }
        ));
    }

    #[test]
    fn test_read_gpx_malformed_time_is_an_error() {
        let gpx = r#"<gpx><trkpt lat="1.0" lon="2.0"><time>yesterday</time></trkpt></gpx>"#;

        let err = read_gpx(gpx.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            ParseError::InvalidValue { field: "time", .. }
        ));
    }

    #[test]
    fn test_read_gpx_truncated_document_is_an_error() {
        let gpx = r#"<gpx><trkpt lat="1.0" lon="2.0"><ele>5"#;

        let err = read_gpx(gpx.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            ParseError::Truncated { index: 0 } | ParseError::Xml { .. }
        ));
    }

    #[test]
    fn test_read_gpx_empty_input_yields_empty_track() {
        let track = read_gpx(b"").unwrap();
        assert!(track.is_empty());
    }

    #[test]
    fn test_read_gpx_self_closing_trkpt() {
        let gpx = r#"<gpx><trkpt lat="1.5" lon="2.5"/></gpx>"#;

        let track = read_gpx(gpx.as_bytes()).unwrap();
        assert_eq!(track.len(), 1);
        assert_eq!(track[0].lat, 1.5);
        assert!(track[0].time.is_nan());
        assert!(track[0].elev.is_nan());
    }

    /// The iterator is lazy: taking one point does not require the rest of
    /// the document to be well-formed.
    #[test]
    fn test_point_iter_is_lazy() {
        let gpx = r#"<gpx>
          <trkpt lat="1.0" lon="2.0"></trkpt>
          <trkpt lon="broken"></trkpt>
        </gpx>"#;

        let mut iter = PointIter::new(gpx.as_bytes(), PointKind::Trackpoint);
        let first = iter.next().unwrap().unwrap();
        assert_eq!(first.lat, 1.0);

        assert!(iter.next().unwrap().is_err());
        // Fused after the error.
        assert!(iter.next().is_none());
    }

    #[test]
    fn test_read_waypoints_matches_wpt_only() {
        let gpx = r#"<gpx>
          <wpt lat="10.0" lon="20.0"><name>Summit</name><ele>1234.5</ele></wpt>
          <trk><trkseg><trkpt lat="1.0" lon="2.0"></trkpt></trkseg></trk>
        </gpx>"#;

        let waypoints = read_waypoints(gpx.as_bytes()).unwrap();
        assert_eq!(waypoints.len(), 1);
        assert_eq!(waypoints[0].lat, 10.0);
        assert_eq!(waypoints[0].elev, 1234.5);

        let track = read_gpx(gpx.as_bytes()).unwrap();
        assert_eq!(track.len(), 1);
    }

    #[test]
    fn test_read_gpx_namespaced_elements() {
        let gpx = r#"<g:gpx xmlns:g="http://www.topografix.com/GPX/1/1">
          <g:trk><g:trkseg>
            <g:trkpt lat="3.0" lon="4.0"><g:ele>7</g:ele></g:trkpt>
          </g:trkseg></g:trk>
        </g:gpx>"#;

        let track = read_gpx(gpx.as_bytes()).unwrap();
        assert_eq!(track.len(), 1);
        assert_eq!(track[0].lat, 3.0);
        assert_eq!(track[0].elev, 7.0);
    }

    #[test]
    fn test_read_kml_coordinates() {
        let kml = r#"<kml xmlns="http://www.opengis.net/kml/2.2">
          <Placemark><LineString><coordinates>
            135.0,-30.0,250.5
            135.001,-30.001,251.0
            135.002,-30.002
          </coordinates></LineString></Placemark>
        </kml>"#;

        let track = read_kml(kml.as_bytes()).unwrap();
        assert_eq!(track.len(), 3);
        assert_eq!(track[0].lon, 135.0);
        assert_eq!(track[0].lat, -30.0);
        assert_eq!(track[0].elev, 250.5);
        assert!(track[2].elev.is_nan());
        assert!(track.iter().all(|p| p.time.is_nan()));
    }

    #[test]
    fn test_read_kml_bad_row_is_an_error() {
        let kml = "<kml><coordinates>135.0,-30.0 garbage</coordinates></kml>";

        let err = read_kml(kml.as_bytes()).unwrap_err();
        assert!(matches!(err, ParseError::InvalidValue { index: 1, .. }));
    }
}
