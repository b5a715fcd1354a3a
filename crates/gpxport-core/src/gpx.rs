//! GPX 1.1 serialization.
//!
//! Writes one [`TrackDocument`] as a well-formed GPX 1.1 document with the
//! Garmin TrackPointExtension namespace. Extension blocks are only emitted
//! for points that actually carry values, and each sub-group is only emitted
//! when non-empty.

use time::format_description::well_known::Rfc3339;

use gpxport_types::{PointExtensions, TrackDocument, TrackPoint, Waypoint};

use crate::error::Result;

/// GPX 1.1 namespace.
pub const GPX_NS: &str = "http://www.topografix.com/GPX/1/1";
/// Garmin track-point-extension namespace.
pub const TPX_NS: &str = "http://www.garmin.com/xmlschemas/TrackPointExtension/v1";
/// Creator attribute value.
pub const CREATOR: &str = "gpxport";

/// Escape text for use in XML content or attribute values.
fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// Serialize a document to GPX.
pub fn write_gpx(doc: &TrackDocument) -> Result<String> {
    let mut out = String::with_capacity(4096 + doc.point_count() * 128);
    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    out.push_str(&format!(
        "<gpx version=\"1.1\" creator=\"{CREATOR}\" xmlns=\"{GPX_NS}\" xmlns:gpxtpx=\"{TPX_NS}\">\n"
    ));

    out.push_str("  <metadata>\n");
    out.push_str(&format!("    <name>{}</name>\n", escape(&doc.metadata.name)));
    out.push_str(&format!(
        "    <desc>{}</desc>\n",
        escape(&doc.metadata.description)
    ));
    out.push_str(&format!(
        "    <time>{}</time>\n",
        doc.metadata.time.format(&Rfc3339)?
    ));
    out.push_str(&format!(
        "    <keywords>{}</keywords>\n",
        escape(&doc.metadata.keywords)
    ));
    out.push_str("  </metadata>\n");

    out.push_str("  <trk>\n");
    out.push_str(&format!("    <name>{}</name>\n", escape(&doc.metadata.name)));
    for segment in &doc.segments {
        out.push_str("    <trkseg>\n");
        for point in &segment.points {
            write_trkpt(&mut out, point)?;
        }
        out.push_str("    </trkseg>\n");
    }
    out.push_str("  </trk>\n");

    for waypoint in &doc.waypoints {
        write_wpt(&mut out, waypoint)?;
    }

    out.push_str("</gpx>\n");
    Ok(out)
}

fn write_trkpt(out: &mut String, point: &TrackPoint) -> Result<()> {
    let loc = &point.location;
    out.push_str(&format!(
        "      <trkpt lat=\"{}\" lon=\"{}\">\n",
        loc.latitude, loc.longitude
    ));
    if let Some(ele) = loc.elevation {
        out.push_str(&format!("        <ele>{ele:.1}</ele>\n"));
    }
    out.push_str(&format!(
        "        <time>{}</time>\n",
        loc.timestamp.format(&Rfc3339)?
    ));
    if let Some(ext) = &point.extensions {
        write_extensions(out, ext);
    }
    out.push_str("      </trkpt>\n");
    Ok(())
}

fn write_extensions(out: &mut String, ext: &PointExtensions) {
    out.push_str("        <extensions>\n");
    out.push_str("          <gpxtpx:TrackPointExtension>\n");
    let tag = |out: &mut String, name: &str, value: String| {
        out.push_str(&format!("            <gpxtpx:{name}>{value}</gpxtpx:{name}>\n"));
    };
    if let Some(hr) = ext.heart_rate {
        tag(out, "hr", format!("{hr:.0}"));
    }
    if let Some(cad) = ext.cadence {
        tag(out, "cad", format!("{cad:.0}"));
    }
    if let Some(cad) = ext.step_cadence {
        tag(out, "cad", format!("{cad:.0}"));
    }
    if let Some(speed) = ext.speed {
        tag(out, "speed", format!("{speed:.2}"));
    }
    if let Some(power) = ext.power {
        tag(out, "power", format!("{power:.0}"));
    }
    if let Some(temp) = ext.temperature {
        tag(out, "atemp", format!("{temp:.1}"));
    }
    if let Some(dynamics) = &ext.running_dynamics {
        out.push_str("            <gpxtpx:RunningDynamics>\n");
        let inner = |out: &mut String, name: &str, value: String| {
            out.push_str(&format!(
                "              <gpxtpx:{name}>{value}</gpxtpx:{name}>\n"
            ));
        };
        if let Some(stride) = dynamics.stride_length {
            inner(out, "StrideLength", format!("{stride:.2}"));
        }
        if let Some(osc) = dynamics.vertical_oscillation {
            inner(out, "VerticalOscillation", format!("{osc:.1}"));
        }
        if let Some(gct) = dynamics.ground_contact_time {
            inner(out, "GroundContactTime", format!("{gct:.0}"));
        }
        out.push_str("            </gpxtpx:RunningDynamics>\n");
    }
    if let Some(custom) = &ext.custom {
        write_custom(out, custom);
    }
    out.push_str("          </gpxtpx:TrackPointExtension>\n");
    out.push_str("        </extensions>\n");
}

fn write_custom(out: &mut String, custom: &gpxport_types::CustomExtensions) {
    out.push_str("            <CustomExtensions>\n");
    let field = |out: &mut String, name: &str, value: String| {
        out.push_str(&format!("                <{name}>{value}</{name}>\n"));
    };
    if let Some(energy) = &custom.energy {
        out.push_str("              <Energy>\n");
        if let Some(active) = energy.active {
            field(out, "Active", format!("{active:.1}"));
        }
        if let Some(basal) = energy.basal {
            field(out, "Basal", format!("{basal:.1}"));
        }
        out.push_str("              </Energy>\n");
    }
    if let Some(physiology) = &custom.physiology {
        out.push_str("              <Physiology>\n");
        if let Some(rr) = physiology.respiratory_rate {
            field(out, "RespiratoryRate", format!("{rr:.1}"));
        }
        out.push_str("              </Physiology>\n");
    }
    if let Some(walking) = &custom.walking_dynamics {
        out.push_str("              <WalkingDynamics>\n");
        if let Some(asym) = walking.asymmetry {
            field(out, "Asymmetry", format!("{asym:.1}"));
        }
        if let Some(ds) = walking.double_support {
            field(out, "DoubleSupport", format!("{ds:.1}"));
        }
        if let Some(step) = walking.step_length {
            field(out, "StepLength", format!("{step:.2}"));
        }
        out.push_str("              </WalkingDynamics>\n");
    }
    if let Some(environment) = &custom.environment {
        out.push_str("              <Environment>\n");
        if let Some(water) = environment.water_temperature {
            field(out, "WaterTemperature", format!("{water:.1}"));
        }
        out.push_str("              </Environment>\n");
    }
    if let Some(movement) = &custom.movement {
        out.push_str("              <Movement>\n");
        if let Some(flights) = movement.flights_climbed {
            field(out, "FlightsClimbed", format!("{flights:.0}"));
        }
        if let Some(up) = movement.stair_ascent_speed {
            field(out, "StairAscentSpeed", format!("{up:.2}"));
        }
        if let Some(down) = movement.stair_descent_speed {
            field(out, "StairDescentSpeed", format!("{down:.2}"));
        }
        out.push_str("              </Movement>\n");
    }
    out.push_str("            </CustomExtensions>\n");
}

fn write_wpt(out: &mut String, waypoint: &Waypoint) -> Result<()> {
    // Derived summary waypoints carry a placeholder position; they are
    // time-anchored annotations, not spatial markers.
    let (lat, lon) = waypoint.position.unwrap_or((0.0, 0.0));
    out.push_str(&format!("  <wpt lat=\"{lat}\" lon=\"{lon}\">\n"));
    out.push_str(&format!(
        "    <time>{}</time>\n",
        waypoint.timestamp.format(&Rfc3339)?
    ));
    out.push_str(&format!("    <name>{}</name>\n", escape(&waypoint.name)));
    out.push_str(&format!("    <desc>{}</desc>\n", escape(&waypoint.description)));
    out.push_str("  </wpt>\n");
    Ok(())
}
