//! Note types (models): field schema, card templates and styling

use serde_json::{Value, json};

const LATEX_PRE: &str = "\\documentclass[12pt]{article}\n\\special{papersize=3in,5in}\n\\usepackage[utf8]{inputenc}\n\\usepackage{amssymb,amsmath}\n\\pagestyle{empty}\n\\setlength{\\parindent}{0in}\n\\begin{document}\n";
const LATEX_POST: &str = "\\end{document}";

const CARD_CSS: &str = r#"
    .card {
        font-family: arial;
        font-size: 30px;
        color: black;
        background-color: white;
        text-align: center;
    }
    "#;

/// A card template: front and back HTML with `{{Field}}` placeholders
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Template {
    /// Template name shown in the review software
    pub name: String,
    /// Question (front) format
    pub qfmt: String,
    /// Answer (back) format
    pub afmt: String,
}

/// A note type
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Model {
    /// Stable id; must not change between builds
    pub id: i64,
    /// Display name
    pub name: String,
    /// Field names in order
    pub fields: Vec<String>,
    /// Card templates; one card per template per note
    pub templates: Vec<Template>,
    /// Stylesheet shared by all templates
    pub css: String,
}

impl Model {
    /// The sentence-card note type: target sentence and audio on the front,
    /// translation on the back.
    pub fn sentence_card(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            fields: vec![
                "Target Language".to_string(),
                "Origin Language".to_string(),
                "Sound".to_string(),
            ],
            templates: vec![Template {
                name: "Card 1".to_string(),
                qfmt: "{{Target Language}}<br/><br/>{{Sound}}".to_string(),
                afmt: "{{FrontSide}}<hr/>{{Origin Language}}".to_string(),
            }],
            css: CARD_CSS.to_string(),
        }
    }

    /// Ordinals of the fields a template's front depends on.
    ///
    /// A card is generated when at least one of them is non-empty. Templates
    /// that reference no field depend on all of them.
    pub fn required_fields(&self, template: &Template) -> Vec<usize> {
        let referenced: Vec<usize> = self
            .fields
            .iter()
            .enumerate()
            .filter(|(_, name)| template.qfmt.contains(&format!("{{{{{}}}}}", name)))
            .map(|(ord, _)| ord)
            .collect();

        if referenced.is_empty() {
            (0..self.fields.len()).collect()
        } else {
            referenced
        }
    }

    /// Ordinals of the templates that produce a card for these field values
    pub fn card_ordinals(&self, fields: &[String]) -> Vec<usize> {
        self.templates
            .iter()
            .enumerate()
            .filter(|(_, template)| {
                self.required_fields(template)
                    .iter()
                    .any(|&ord| fields.get(ord).is_some_and(|v| !v.trim().is_empty()))
            })
            .map(|(ord, _)| ord)
            .collect()
    }

    /// Entry for the `models` column of the collection row
    pub fn to_json(&self, deck_id: i64, modified: i64) -> Value {
        let fields: Vec<Value> = self
            .fields
            .iter()
            .enumerate()
            .map(|(ord, name)| {
                json!({
                    "name": name,
                    "ord": ord,
                    "font": "Arial",
                    "media": [],
                    "rtl": false,
                    "size": 20,
                    "sticky": false,
                })
            })
            .collect();

        let templates: Vec<Value> = self
            .templates
            .iter()
            .enumerate()
            .map(|(ord, t)| {
                json!({
                    "name": t.name,
                    "ord": ord,
                    "qfmt": t.qfmt,
                    "afmt": t.afmt,
                    "bafmt": "",
                    "bqfmt": "",
                    "bfont": "",
                    "bsize": 0,
                    "did": null,
                })
            })
            .collect();

        let req: Vec<Value> = self
            .templates
            .iter()
            .enumerate()
            .map(|(ord, t)| json!([ord, "any", self.required_fields(t)]))
            .collect();

        json!({
            "id": self.id.to_string(),
            "name": self.name,
            "type": 0,
            "mod": modified,
            "usn": -1,
            "sortf": 0,
            "did": deck_id,
            "tmpls": templates,
            "flds": fields,
            "css": self.css,
            "latexPre": LATEX_PRE,
            "latexPost": LATEX_POST,
            "latexsvg": false,
            "req": req,
            "tags": [],
            "vers": [],
        })
    }
}
