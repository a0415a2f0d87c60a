//! Deck builder: write slide chunks as a `.pptx` package.
//!
//! A `.pptx` is a zip of XML parts (Office Open XML, ECMA-376). We emit the
//! smallest set PowerPoint, LibreOffice and Keynote all open:
//!
//! ```text
//! [Content_Types].xml            part → content-type map
//! _rels/.rels                    package → presentation, docProps
//! docProps/{app,core}.xml        slide count, title, timestamps
//! ppt/presentation.xml (+rels)   slide id list, slide size
//! ppt/slideMasters/slideMaster1  placeholder geometry, text styles
//! ppt/slideLayouts/slideLayout1  "Title Slide"
//! ppt/slideLayouts/slideLayout2  "Title and Content"
//! ppt/notesMasters/notesMaster1  presenter-notes geometry
//! ppt/theme/theme{1,2}.xml       colours and fonts
//! ppt/slides/slideN.xml (+rels)  one per slide
//! ppt/notesSlides/notesSlideN    presenter notes for every slide but the first
//! ```
//!
//! Slide 1 is a title slide, every chunk then gets exactly one slide in
//! ordinal order, and a closing slide ends the deck, so
//! `slide_count == chunks.len() + 2`. Slides are plain: one bullet per chunk
//! line, autofit on.
//!
//! Building can be cancelled through an [`AtomicBool`]: the writer checks it
//! between slides and once more before the rename, so a cancelled build
//! leaves neither the deck nor its `.part` file behind.

use crate::error::ConversionError;
use crate::phrasing::Phrasing;
use crate::pipeline::segment::SlideContentChunk;
use chrono::{SecondsFormat, Utc};
use std::fs::File;
use std::io::{BufReader, BufWriter, Seek, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Media type of a `.pptx` package.
pub const MIME_PPTX: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation";

/// Deck-level text for the opening and closing slides and document properties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeckMeta {
    pub title: String,
    pub subtitle: String,
    pub closing_title: String,
    pub closing_text: String,
    pub closing_note: String,
}

impl DeckMeta {
    /// Title from the uploaded file's name, e.g. `Q3 report.pdf` → `Q3 report`;
    /// the rest from the audience's phrasing.
    pub fn from_filename(original_filename: &str, words: &Phrasing) -> Self {
        let base = original_filename
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(original_filename);
        let stem = match base.rfind('.') {
            Some(i) if i > 0 => &base[..i],
            _ => base,
        };
        let title = stem.replace('_', " ").trim().to_string();
        Self {
            title: if title.is_empty() {
                "Document Conversion".to_string()
            } else {
                title
            },
            subtitle: words.deck_subtitle.to_string(),
            closing_title: words.closing_title.to_string(),
            closing_text: words.closing_text.to_string(),
            closing_note: words.closing_note.to_string(),
        }
    }
}

/// Sibling file a deck is written to before it is renamed to `path`.
pub fn partial_path(path: &Path) -> PathBuf {
    path.with_extension("pptx.part")
}

/// Write the deck to `path` atomically. Returns the slide count.
///
/// The package is written to [`partial_path`] and renamed into place, so
/// `path` either holds a complete deck or does not exist.
pub fn build_deck(
    chunks: &[SlideContentChunk],
    meta: &DeckMeta,
    path: &Path,
) -> Result<usize, ConversionError> {
    build_deck_until(chunks, meta, path, &AtomicBool::new(false))
}

/// [`build_deck`] that gives up with a `BuildError` once `cancel` is set.
pub fn build_deck_until(
    chunks: &[SlideContentChunk],
    meta: &DeckMeta,
    path: &Path,
    cancel: &AtomicBool,
) -> Result<usize, ConversionError> {
    let tmp_path = partial_path(path);
    let result = File::create(&tmp_path)
        .map_err(|e| ConversionError::build(format!("cannot create deck file ({e})")))
        .and_then(|file| {
            let mut writer = BufWriter::new(file);
            let count = write_package(&mut writer, chunks, meta, cancel)?;
            writer
                .flush()
                .map_err(|e| ConversionError::build(format!("cannot flush deck ({e})")))?;
            Ok(count)
        })
        .and_then(|count| {
            check(cancel)?;
            std::fs::rename(&tmp_path, path)
                .map_err(|e| ConversionError::build(format!("cannot finalise deck ({e})")))?;
            Ok(count)
        });

    if result.is_err() {
        let _ = std::fs::remove_file(&tmp_path);
    }
    result
}

/// Serialise the whole package into `writer`. Returns the slide count.
pub fn write_deck<W: Write + Seek>(
    writer: W,
    chunks: &[SlideContentChunk],
    meta: &DeckMeta,
) -> Result<usize, ConversionError> {
    write_package(writer, chunks, meta, &AtomicBool::new(false))
}

fn check(cancel: &AtomicBool) -> Result<(), ConversionError> {
    if cancel.load(Ordering::Relaxed) {
        return Err(ConversionError::build("deck generation cancelled"));
    }
    Ok(())
}

fn write_package<W: Write + Seek>(
    writer: W,
    chunks: &[SlideContentChunk],
    meta: &DeckMeta,
    cancel: &AtomicBool,
) -> Result<usize, ConversionError> {
    let slide_count = chunks.len() + 2;
    let mut pkg = Package::new(writer);

    pkg.part("[Content_Types].xml", &content_types(slide_count))?;
    pkg.part("_rels/.rels", ROOT_RELS)?;
    pkg.part("docProps/app.xml", &app_props(slide_count))?;
    pkg.part("docProps/core.xml", &core_props(&meta.title))?;
    pkg.part("ppt/presentation.xml", &presentation(slide_count))?;
    pkg.part("ppt/_rels/presentation.xml.rels", &presentation_rels(slide_count))?;
    pkg.part("ppt/slideMasters/slideMaster1.xml", SLIDE_MASTER)?;
    pkg.part("ppt/slideMasters/_rels/slideMaster1.xml.rels", SLIDE_MASTER_RELS)?;
    pkg.part("ppt/slideLayouts/slideLayout1.xml", LAYOUT_TITLE)?;
    pkg.part("ppt/slideLayouts/_rels/slideLayout1.xml.rels", LAYOUT_RELS)?;
    pkg.part("ppt/slideLayouts/slideLayout2.xml", LAYOUT_CONTENT)?;
    pkg.part("ppt/slideLayouts/_rels/slideLayout2.xml.rels", LAYOUT_RELS)?;
    pkg.part("ppt/notesMasters/notesMaster1.xml", NOTES_MASTER)?;
    pkg.part("ppt/notesMasters/_rels/notesMaster1.xml.rels", NOTES_MASTER_RELS)?;
    pkg.part("ppt/theme/theme1.xml", THEME)?;
    pkg.part("ppt/theme/theme2.xml", THEME)?;

    pkg.part("ppt/slides/slide1.xml", &title_slide(meta))?;
    pkg.part("ppt/slides/_rels/slide1.xml.rels", &slide_rels(1, false))?;

    for (i, chunk) in chunks.iter().enumerate() {
        check(cancel)?;
        pkg.content_slide(i + 2, &chunk.title, &chunk.text, &chunk.notes)?;
    }
    check(cancel)?;
    pkg.content_slide(
        slide_count,
        &meta.closing_title,
        &meta.closing_text,
        &meta.closing_note,
    )?;

    pkg.finish()?;
    debug!("Wrote deck with {} slides", slide_count);
    Ok(slide_count)
}

/// Count the slides of an existing `.pptx`, rejecting anything that is not one.
pub fn count_slides(path: &Path) -> Result<usize, ConversionError> {
    let file = File::open(path)
        .map_err(|e| ConversionError::build(format!("cannot open deck ({e})")))?;
    let archive = ZipArchive::new(BufReader::new(file))
        .map_err(|_| ConversionError::build("output is not a valid .pptx package"))?;
    match archive.file_names().filter(|n| is_slide_part(n)).count() {
        0 => Err(ConversionError::build("output deck has no slides")),
        n => Ok(n),
    }
}

/// `ppt/slides/slide12.xml` → true; rels and other parts → false.
fn is_slide_part(name: &str) -> bool {
    name.strip_prefix("ppt/slides/slide")
        .and_then(|rest| rest.strip_suffix(".xml"))
        .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
}

// ── Zip plumbing ─────────────────────────────────────────────────────────────

struct Package<W: Write + Seek> {
    zip: ZipWriter<W>,
    options: FileOptions,
}

impl<W: Write + Seek> Package<W> {
    fn new(writer: W) -> Self {
        Self {
            zip: ZipWriter::new(writer),
            options: FileOptions::default().compression_method(CompressionMethod::Deflated),
        }
    }

    fn part(&mut self, name: &str, xml: &str) -> Result<(), ConversionError> {
        self.zip
            .start_file(name, self.options)
            .map_err(|e| ConversionError::build(format!("cannot add {name} ({e})")))?;
        self.zip
            .write_all(xml.as_bytes())
            .map_err(|e| ConversionError::build(format!("cannot write {name} ({e})")))
    }

    /// Slide `n` with the title-and-content layout and its notes page.
    fn content_slide(
        &mut self,
        n: usize,
        title: &str,
        text: &str,
        notes: &str,
    ) -> Result<(), ConversionError> {
        self.part(&format!("ppt/slides/slide{n}.xml"), &content_slide(title, text))?;
        self.part(
            &format!("ppt/slides/_rels/slide{n}.xml.rels"),
            &slide_rels(n, true),
        )?;
        self.part(
            &format!("ppt/notesSlides/notesSlide{n}.xml"),
            &notes_slide(notes),
        )?;
        self.part(
            &format!("ppt/notesSlides/_rels/notesSlide{n}.xml.rels"),
            &notes_rels(n),
        )
    }

    fn finish(mut self) -> Result<W, ConversionError> {
        self.zip
            .finish()
            .map_err(|e| ConversionError::build(format!("cannot finish package ({e})")))
    }
}

/// Escape text for an XML text node, dropping characters XML 1.0 forbids.
fn xml_text(s: &str) -> String {
    let clean: String = s
        .chars()
        .filter(|&c| {
            matches!(c, '\t' | '\n' | '\r') || (c >= ' ' && c != '\u{FFFE}' && c != '\u{FFFF}')
        })
        .collect();
    quick_xml::escape::escape(clean.as_str()).into_owned()
}

// ── Generated parts ──────────────────────────────────────────────────────────

const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;
const NS: &str = r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main""#;
const REL_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const REL: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

const GROUP_PROPS: &str = r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/><a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr>"#;

fn content_types(slide_count: usize) -> String {
    let mut s = format!(
        r#"{XML_DECL}<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/ppt/presentation.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"/><Override PartName="/ppt/slideMasters/slideMaster1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml"/><Override PartName="/ppt/slideLayouts/slideLayout1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml"/><Override PartName="/ppt/slideLayouts/slideLayout2.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml"/><Override PartName="/ppt/notesMasters/notesMaster1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.notesMaster+xml"/><Override PartName="/ppt/theme/theme1.xml" ContentType="application/vnd.openxmlformats-officedocument.theme+xml"/><Override PartName="/ppt/theme/theme2.xml" ContentType="application/vnd.openxmlformats-officedocument.theme+xml"/><Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/><Override PartName="/docProps/app.xml" ContentType="application/vnd.openxmlformats-officedocument.extended-properties+xml"/>"#
    );
    for n in 1..=slide_count {
        s.push_str(&format!(
            r#"<Override PartName="/ppt/slides/slide{n}.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slide+xml"/>"#
        ));
        if n > 1 {
            s.push_str(&format!(
                r#"<Override PartName="/ppt/notesSlides/notesSlide{n}.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.notesSlide+xml"/>"#
            ));
        }
    }
    s.push_str("</Types>");
    s
}

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="ppt/presentation.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/><Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties" Target="docProps/app.xml"/></Relationships>"#;

fn app_props(slide_count: usize) -> String {
    format!(
        r#"{XML_DECL}<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties"><Application>doc2deck</Application><PresentationFormat>Widescreen</PresentationFormat><Slides>{slide_count}</Slides><Notes>{}</Notes></Properties>"#,
        slide_count - 1
    )
}

fn core_props(title: &str) -> String {
    let now = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
    format!(
        r#"{XML_DECL}<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"><dc:title>{}</dc:title><dc:creator>doc2deck</dc:creator><dcterms:created xsi:type="dcterms:W3CDTF">{now}</dcterms:created><dcterms:modified xsi:type="dcterms:W3CDTF">{now}</dcterms:modified></cp:coreProperties>"#,
        xml_text(title)
    )
}

/// Relationship ids in `presentation.xml.rels`: rId1 master, rId2 notes
/// master, rId3 theme, rId4.. slides.
const FIRST_SLIDE_RID: usize = 4;

fn presentation(slide_count: usize) -> String {
    let ids: String = (0..slide_count)
        .map(|i| format!(r#"<p:sldId id="{}" r:id="rId{}"/>"#, 256 + i, FIRST_SLIDE_RID + i))
        .collect();
    format!(
        r#"{XML_DECL}<p:presentation {NS} saveSubsetFonts="1"><p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst><p:notesMasterIdLst><p:notesMasterId r:id="rId2"/></p:notesMasterIdLst><p:sldIdLst>{ids}</p:sldIdLst><p:sldSz cx="12192000" cy="6858000"/><p:notesSz cx="6858000" cy="9144000"/></p:presentation>"#
    )
}

fn presentation_rels(slide_count: usize) -> String {
    let slides: String = (0..slide_count)
        .map(|i| {
            format!(
                r#"<Relationship Id="rId{}" Type="{REL}/slide" Target="slides/slide{}.xml"/>"#,
                FIRST_SLIDE_RID + i,
                i + 1
            )
        })
        .collect();
    format!(
        r#"{XML_DECL}<Relationships xmlns="{REL_NS}"><Relationship Id="rId1" Type="{REL}/slideMaster" Target="slideMasters/slideMaster1.xml"/><Relationship Id="rId2" Type="{REL}/notesMaster" Target="notesMasters/notesMaster1.xml"/><Relationship Id="rId3" Type="{REL}/theme" Target="theme/theme1.xml"/>{slides}</Relationships>"#
    )
}

fn slide_rels(n: usize, with_notes: bool) -> String {
    let layout = if with_notes { 2 } else { 1 };
    let notes = if with_notes {
        format!(r#"<Relationship Id="rId2" Type="{REL}/notesSlide" Target="../notesSlides/notesSlide{n}.xml"/>"#)
    } else {
        String::new()
    };
    format!(
        r#"{XML_DECL}<Relationships xmlns="{REL_NS}"><Relationship Id="rId1" Type="{REL}/slideLayout" Target="../slideLayouts/slideLayout{layout}.xml"/>{notes}</Relationships>"#
    )
}

fn notes_rels(n: usize) -> String {
    format!(
        r#"{XML_DECL}<Relationships xmlns="{REL_NS}"><Relationship Id="rId1" Type="{REL}/notesMaster" Target="../notesMasters/notesMaster1.xml"/><Relationship Id="rId2" Type="{REL}/slide" Target="../slides/slide{n}.xml"/></Relationships>"#
    )
}

/// One `<a:p>` per non-empty line; an empty text still needs one paragraph.
fn paragraphs(text: &str) -> String {
    let mut out: String = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(|l| {
            format!(
                r#"<a:p><a:r><a:rPr lang="en-US" dirty="0"/><a:t>{}</a:t></a:r></a:p>"#,
                xml_text(l)
            )
        })
        .collect();
    if out.is_empty() {
        out.push_str(r#"<a:p><a:endParaRPr lang="en-US" dirty="0"/></a:p>"#);
    }
    out
}

fn placeholder(id: u32, name: &str, ph: &str, body_pr: &str, text: &str) -> String {
    format!(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="{name}"/><p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr><p:nvPr>{ph}</p:nvPr></p:nvSpPr><p:spPr/><p:txBody>{body_pr}<a:lstStyle/>{}</p:txBody></p:sp>"#,
        paragraphs(text)
    )
}

fn slide(shapes: &str) -> String {
    format!(
        r#"{XML_DECL}<p:sld {NS}><p:cSld><p:spTree>{GROUP_PROPS}{shapes}</p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sld>"#
    )
}

fn title_slide(meta: &DeckMeta) -> String {
    slide(&format!(
        "{}{}",
        placeholder(2, "Title 1", r#"<p:ph type="ctrTitle"/>"#, "<a:bodyPr/>", &meta.title),
        placeholder(
            3,
            "Subtitle 2",
            r#"<p:ph type="subTitle" idx="1"/>"#,
            "<a:bodyPr/>",
            &meta.subtitle
        ),
    ))
}

fn content_slide(title: &str, text: &str) -> String {
    slide(&format!(
        "{}{}",
        placeholder(2, "Title 1", r#"<p:ph type="title"/>"#, "<a:bodyPr/>", title),
        placeholder(
            3,
            "Content 2",
            r#"<p:ph idx="1"/>"#,
            "<a:bodyPr><a:normAutofit/></a:bodyPr>",
            text
        ),
    ))
}

fn notes_slide(notes: &str) -> String {
    format!(
        r#"{XML_DECL}<p:notes {NS}><p:cSld><p:spTree>{GROUP_PROPS}{}</p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:notes>"#,
        placeholder(
            2,
            "Notes Placeholder 1",
            r#"<p:ph type="body" idx="1"/>"#,
            "<a:bodyPr/>",
            notes
        )
    )
}

// ── Static parts ─────────────────────────────────────────────────────────────

const SLIDE_MASTER: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:sldMaster xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:cSld><p:bg><p:bgRef idx="1001"><a:schemeClr val="bg1"/></p:bgRef></p:bg><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/><a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr><p:sp><p:nvSpPr><p:cNvPr id="2" name="Title Placeholder 1"/><p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr><p:nvPr><p:ph type="title"/></p:nvPr></p:nvSpPr><p:spPr><a:xfrm><a:off x="838200" y="365125"/><a:ext cx="10515600" cy="1325563"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr><p:txBody><a:bodyPr anchor="ctr"><a:normAutofit/></a:bodyPr><a:lstStyle/><a:p><a:endParaRPr lang="en-US"/></a:p></p:txBody></p:sp><p:sp><p:nvSpPr><p:cNvPr id="3" name="Text Placeholder 2"/><p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr><p:nvPr><p:ph type="body" idx="1"/></p:nvPr></p:nvSpPr><p:spPr><a:xfrm><a:off x="838200" y="1825625"/><a:ext cx="10515600" cy="4351338"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr><p:txBody><a:bodyPr><a:normAutofit/></a:bodyPr><a:lstStyle/><a:p><a:endParaRPr lang="en-US"/></a:p></p:txBody></p:sp></p:spTree></p:cSld><p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/><p:sldLayoutIdLst><p:sldLayoutId id="2147483649" r:id="rId1"/><p:sldLayoutId id="2147483650" r:id="rId2"/></p:sldLayoutIdLst><p:txStyles><p:titleStyle><a:lvl1pPr algn="l"><a:defRPr sz="4000" kern="1200"><a:solidFill><a:schemeClr val="tx1"/></a:solidFill><a:latin typeface="+mj-lt"/></a:defRPr></a:lvl1pPr></p:titleStyle><p:bodyStyle><a:lvl1pPr marL="228600" indent="-228600"><a:spcBef><a:spcPts val="1000"/></a:spcBef><a:buFont typeface="Arial"/><a:buChar char="&#8226;"/><a:defRPr sz="2400" kern="1200"><a:solidFill><a:schemeClr val="tx1"/></a:solidFill><a:latin typeface="+mn-lt"/></a:defRPr></a:lvl1pPr></p:bodyStyle><p:otherStyle><a:lvl1pPr><a:defRPr sz="1800"><a:solidFill><a:schemeClr val="tx1"/></a:solidFill></a:defRPr></a:lvl1pPr></p:otherStyle></p:txStyles></p:sldMaster>"#;

const SLIDE_MASTER_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout" Target="../slideLayouts/slideLayout1.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout" Target="../slideLayouts/slideLayout2.xml"/><Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme" Target="../theme/theme1.xml"/></Relationships>"#;

const LAYOUT_TITLE: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:sldLayout xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" type="title" preserve="1"><p:cSld name="Title Slide"><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/><a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr><p:sp><p:nvSpPr><p:cNvPr id="2" name="Title 1"/><p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr><p:nvPr><p:ph type="ctrTitle"/></p:nvPr></p:nvSpPr><p:spPr><a:xfrm><a:off x="1524000" y="1122363"/><a:ext cx="9144000" cy="2387600"/></a:xfrm></p:spPr><p:txBody><a:bodyPr anchor="b"/><a:lstStyle><a:lvl1pPr algn="ctr"><a:defRPr sz="5400"/></a:lvl1pPr></a:lstStyle><a:p><a:endParaRPr lang="en-US"/></a:p></p:txBody></p:sp><p:sp><p:nvSpPr><p:cNvPr id="3" name="Subtitle 2"/><p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr><p:nvPr><p:ph type="subTitle" idx="1"/></p:nvPr></p:nvSpPr><p:spPr><a:xfrm><a:off x="1524000" y="3602038"/><a:ext cx="9144000" cy="1655762"/></a:xfrm></p:spPr><p:txBody><a:bodyPr/><a:lstStyle><a:lvl1pPr marL="0" indent="0" algn="ctr"><a:buNone/><a:defRPr sz="2400"/></a:lvl1pPr></a:lstStyle><a:p><a:endParaRPr lang="en-US"/></a:p></p:txBody></p:sp></p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sldLayout>"#;

const LAYOUT_CONTENT: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:sldLayout xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" type="obj" preserve="1"><p:cSld name="Title and Content"><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/><a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr><p:sp><p:nvSpPr><p:cNvPr id="2" name="Title 1"/><p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr><p:nvPr><p:ph type="title"/></p:nvPr></p:nvSpPr><p:spPr/><p:txBody><a:bodyPr/><a:lstStyle/><a:p><a:endParaRPr lang="en-US"/></a:p></p:txBody></p:sp><p:sp><p:nvSpPr><p:cNvPr id="3" name="Content Placeholder 2"/><p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr><p:nvPr><p:ph idx="1"/></p:nvPr></p:nvSpPr><p:spPr/><p:txBody><a:bodyPr/><a:lstStyle/><a:p><a:endParaRPr lang="en-US"/></a:p></p:txBody></p:sp></p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sldLayout>"#;

const LAYOUT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster" Target="../slideMasters/slideMaster1.xml"/></Relationships>"#;

const NOTES_MASTER: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:notesMaster xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:cSld><p:bg><p:bgRef idx="1001"><a:schemeClr val="bg1"/></p:bgRef></p:bg><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/><a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr><p:sp><p:nvSpPr><p:cNvPr id="2" name="Notes Placeholder 1"/><p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr><p:nvPr><p:ph type="body" idx="1"/></p:nvPr></p:nvSpPr><p:spPr><a:xfrm><a:off x="685800" y="4400550"/><a:ext cx="5486400" cy="3600450"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr><p:txBody><a:bodyPr/><a:lstStyle/><a:p><a:endParaRPr lang="en-US"/></a:p></p:txBody></p:sp></p:spTree></p:cSld><p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/></p:notesMaster>"#;

const NOTES_MASTER_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme" Target="../theme/theme2.xml"/></Relationships>"#;

const THEME: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" name="Office Theme"><a:themeElements><a:clrScheme name="Office"><a:dk1><a:sysClr val="windowText" lastClr="000000"/></a:dk1><a:lt1><a:sysClr val="window" lastClr="FFFFFF"/></a:lt1><a:dk2><a:srgbClr val="1F497D"/></a:dk2><a:lt2><a:srgbClr val="EEECE1"/></a:lt2><a:accent1><a:srgbClr val="4F81BD"/></a:accent1><a:accent2><a:srgbClr val="C0504D"/></a:accent2><a:accent3><a:srgbClr val="9BBB59"/></a:accent3><a:accent4><a:srgbClr val="8064A2"/></a:accent4><a:accent5><a:srgbClr val="4BACC6"/></a:accent5><a:accent6><a:srgbClr val="F79646"/></a:accent6><a:hlink><a:srgbClr val="0000FF"/></a:hlink><a:folHlink><a:srgbClr val="800080"/></a:folHlink></a:clrScheme><a:fontScheme name="Office"><a:majorFont><a:latin typeface="Calibri Light"/><a:ea typeface=""/><a:cs typeface=""/></a:majorFont><a:minorFont><a:latin typeface="Calibri"/><a:ea typeface=""/><a:cs typeface=""/></a:minorFont></a:fontScheme><a:fmtScheme name="Office"><a:fillStyleLst><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:fillStyleLst><a:lnStyleLst><a:ln w="9525"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln><a:ln w="25400"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln><a:ln w="38100"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln></a:lnStyleLst><a:effectStyleLst><a:effectStyle><a:effectLst/></a:effectStyle><a:effectStyle><a:effectLst/></a:effectStyle><a:effectStyle><a:effectLst/></a:effectStyle></a:effectStyleLst><a:bgFillStyleLst><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:bgFillStyleLst></a:fmtScheme></a:themeElements><a:objectDefaults/><a:extraClrSchemeLst/></a:theme>"#;
