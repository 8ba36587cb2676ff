//! Minimal MusicXML document construction.
//!
//! Used by the stub engine to produce a syntactically valid score-partwise
//! document: one part, one measure, a single whole note. Real output comes
//! from Audiveris; this exists so the service pipeline can be exercised end
//! to end without it.

/// MusicXML version emitted in the document header.
const MUSICXML_VERSION: &str = "3.1";

/// Build a single-measure placeholder score.
///
/// The document carries `title` as the work title and contains a G-clef 4/4
/// measure with one whole C4 note.
pub fn placeholder_score(title: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE score-partwise PUBLIC "-//Recordare//DTD MusicXML {version} Partwise//EN" "http://www.musicxml.org/dtds/partwise.dtd">
<score-partwise version="{version}">
  <work>
    <work-title>{title}</work-title>
  </work>
  <identification>
    <creator type="software">staffline</creator>
  </identification>
  <part-list>
    <score-part id="P1">
      <part-name>Music</part-name>
    </score-part>
  </part-list>
  <part id="P1">
    <measure number="1">
      <attributes>
        <divisions>1</divisions>
        <key><fifths>0</fifths></key>
        <time><beats>4</beats><beat-type>4</beat-type></time>
        <clef><sign>G</sign><line>2</line></clef>
      </attributes>
      <note>
        <pitch><step>C</step><octave>4</octave></pitch>
        <duration>4</duration>
        <type>whole</type>
      </note>
    </measure>
  </part>
</score-partwise>
"#,
        version = MUSICXML_VERSION,
        title = escape_text(title),
    )
}

/// Escape the five XML-reserved characters in text content.
fn escape_text(s: &str) -> String {
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
