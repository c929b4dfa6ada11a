use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::api::{ApiClientError, Compression, ResizeMode};

/// Names extras may not use even when the matching field is unset.
const RESERVED_FIELDS: [&str; 6] = [
    "key",
    "plugin_version",
    "urllist",
    "file_paths",
    "paramlist",
    "returndatalist",
];

/// Options sent with every optimization request.
///
/// Unrecognized service options go through [`OptimizeOptions::with_extra`];
/// an extra whose name matches a recognized field is rejected when the
/// request is built.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OptimizeOptions {
    pub lossy: Compression,
    /// Seconds the service may hold the request before answering pending.
    pub wait: u32,
    pub resize: ResizeMode,
    pub resize_width: u32,
    pub resize_height: u32,
    #[serde(serialize_with = "as_flag")]
    pub cmyk2rgb: bool,
    #[serde(serialize_with = "as_flag")]
    pub keep_exif: bool,
    /// Target format, e.g. `+webp` or `jpg`. Empty keeps the original.
    pub convertto: String,
    #[serde(serialize_with = "as_flag")]
    pub bg_remove: bool,
    #[serde(serialize_with = "as_flag")]
    pub refresh: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paramlist: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub returndatalist: Option<Value>,
    /// Write optimized images back over the submitted local files.
    #[serde(skip)]
    pub replace_original: bool,
    #[serde(skip)]
    pub extra: Map<String, Value>,
}

fn as_flag<S: Serializer>(flag: &bool, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u8(u8::from(*flag))
}

impl Default for OptimizeOptions {
    fn default() -> Self {
        Self {
            lossy: Compression::Lossy,
            wait: 20,
            resize: ResizeMode::None,
            resize_width: 1024,
            resize_height: 1024,
            cmyk2rgb: true,
            keep_exif: false,
            convertto: String::new(),
            bg_remove: false,
            refresh: false,
            paramlist: None,
            returndatalist: None,
            replace_original: false,
            extra: Map::new(),
        }
    }
}

impl OptimizeOptions {
    #[must_use]
    pub fn with_compression(mut self, lossy: Compression) -> Self {
        self.lossy = lossy;
        self
    }

    #[must_use]
    pub fn with_wait(mut self, wait: u32) -> Self {
        self.wait = wait;
        self
    }

    #[must_use]
    pub fn with_resize(mut self, mode: ResizeMode, width: u32, height: u32) -> Self {
        self.resize = mode;
        self.resize_width = width;
        self.resize_height = height;
        self
    }

    #[must_use]
    pub fn with_cmyk2rgb(mut self, cmyk2rgb: bool) -> Self {
        self.cmyk2rgb = cmyk2rgb;
        self
    }

    #[must_use]
    pub fn with_keep_exif(mut self, keep_exif: bool) -> Self {
        self.keep_exif = keep_exif;
        self
    }

    #[must_use]
    pub fn with_convert_to(mut self, format: impl Into<String>) -> Self {
        self.convertto = format.into();
        self
    }

    #[must_use]
    pub fn with_bg_remove(mut self, bg_remove: bool) -> Self {
        self.bg_remove = bg_remove;
        self
    }

    #[must_use]
    pub fn with_refresh(mut self, refresh: bool) -> Self {
        self.refresh = refresh;
        self
    }

    #[must_use]
    pub fn with_paramlist(mut self, paramlist: Vec<Value>) -> Self {
        self.paramlist = Some(paramlist);
        self
    }

    #[must_use]
    pub fn with_returndatalist(mut self, returndatalist: Value) -> Self {
        self.returndatalist = Some(returndatalist);
        self
    }

    #[must_use]
    pub fn with_replace_original(mut self, replace_original: bool) -> Self {
        self.replace_original = replace_original;
        self
    }

    /// Adds a raw field sent as-is.
    #[must_use]
    pub fn with_extra(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(name.into(), value.into());
        self
    }

    /// Request fields for these options, extras merged in.
    ///
    /// # Errors
    ///
    /// Returns [`ApiClientError::ReservedOption`] if an extra shadows a
    /// recognized field.
    pub fn fields(&self) -> Result<Map<String, Value>, ApiClientError> {
        let mut fields: Map<String, Value> = serde_json::from_value(serde_json::to_value(self)?)?;

        for (name, value) in &self.extra {
            if fields.contains_key(name) || RESERVED_FIELDS.contains(&name.as_str()) {
                return Err(ApiClientError::ReservedOption(name.clone()));
            }
            fields.insert(name.clone(), value.clone());
        }

        Ok(fields)
    }
}

/// Text representation of a field in a multipart form.
pub(crate) fn form_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn defaults_match_service_defaults() {
        let fields = OptimizeOptions::default().fields().unwrap();
        assert_eq!(
            Value::Object(fields),
            json!({
                "lossy": 1,
                "wait": 20,
                "resize": 0,
                "resize_width": 1024,
                "resize_height": 1024,
                "cmyk2rgb": 1,
                "keep_exif": 0,
                "convertto": "",
                "bg_remove": 0,
                "refresh": 0
            })
        );
    }

    #[test]
    fn builder_sets_fields() {
        let fields = OptimizeOptions::default()
            .with_compression(Compression::Glossy)
            .with_wait(5)
            .with_resize(ResizeMode::Inner, 800, 600)
            .with_keep_exif(true)
            .with_convert_to("+webp")
            .with_returndatalist(json!({"id": 7}))
            .fields()
            .unwrap();

        assert_eq!(fields["lossy"], json!(2));
        assert_eq!(fields["wait"], json!(5));
        assert_eq!(fields["resize"], json!(3));
        assert_eq!(fields["resize_width"], json!(800));
        assert_eq!(fields["resize_height"], json!(600));
        assert_eq!(fields["keep_exif"], json!(1));
        assert_eq!(fields["convertto"], json!("+webp"));
        assert_eq!(fields["returndatalist"], json!({"id": 7}));
        assert!(!fields.contains_key("paramlist"));
    }

    #[test]
    fn replace_original_never_reaches_the_wire() {
        let fields = OptimizeOptions::default()
            .with_replace_original(true)
            .fields()
            .unwrap();
        assert!(!fields.contains_key("replace_original"));
        assert!(!fields.contains_key("extra"));
    }

    #[test]
    fn extras_are_merged() {
        let fields = OptimizeOptions::default()
            .with_extra("upscale", 2)
            .fields()
            .unwrap();
        assert_eq!(fields["upscale"], json!(2));
    }

    #[test]
    fn extras_cannot_shadow_known_fields() {
        let err = OptimizeOptions::default()
            .with_extra("lossy", 0)
            .fields()
            .unwrap_err();
        assert!(matches!(err, ApiClientError::ReservedOption(name) if name == "lossy"));

        let err = OptimizeOptions::default()
            .with_extra("key", "other")
            .fields()
            .unwrap_err();
        assert_eq!(err.error_code(), "E006");
    }

    #[test]
    fn form_text_unquotes_strings() {
        assert_eq!(form_text(&json!("+webp")), "+webp");
        assert_eq!(form_text(&json!(20)), "20");
        assert_eq!(form_text(&json!([1, 2])), "[1,2]");
    }
}
