//! Request inputs and their defaults.
//!
//! The HTTP layer hands over raw form fields; [`RequestParams::from_fields`]
//! resolves them once into typed values so no pipeline stage ever sees a
//! missing or stringly-typed parameter.
//!
//! | Field | Default |
//! |---|---|
//! | `platform` | `"custom"` |
//! | `aspect` | `"16:9"` |
//! | `upscale` | `false` |
//! | `title` | `""` |
//! | `link` | `""` |

/// Layout parameters for one thumbnail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestParams {
    pub platform: String,
    pub aspect: String,
    pub upscale: bool,
    pub title: String,
    pub link: String,
}

impl Default for RequestParams {
    fn default() -> Self {
        Self {
            platform: "custom".to_string(),
            aspect: "16:9".to_string(),
            upscale: false,
            title: String::new(),
            link: String::new(),
        }
    }
}

impl RequestParams {
    /// Build parameters from form fields.
    ///
    /// Missing fields keep their defaults, unknown fields are ignored, and
    /// `title`/`link` are trimmed. A repeated field takes its last value.
    pub fn from_fields<'a, I>(fields: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut params = Self::default();
        for (key, value) in fields {
            match key {
                "platform" => params.platform = value.to_string(),
                "aspect" => params.aspect = value.to_string(),
                "upscale" => params.upscale = parse_flag(value),
                "title" => params.title = value.trim().to_string(),
                "link" => params.link = value.trim().to_string(),
                _ => {}
            }
        }
        params
    }
}

/// Lenient boolean: `1`, `true`, `on`, `yes` (any case) are true, anything else false.
pub fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "on" | "yes"
    )
}

/// Everything the pipeline needs for one thumbnail.
#[derive(Debug, Clone, Default)]
pub struct ThumbnailRequest {
    /// Required; `None` or empty is rejected before any decoding.
    pub main_image: Option<Vec<u8>>,
    pub watermark: Option<Vec<u8>>,
    pub params: RequestParams,
}

impl ThumbnailRequest {
    pub fn new(main_image: Vec<u8>) -> Self {
        Self {
            main_image: Some(main_image),
            ..Self::default()
        }
    }

    pub fn with_watermark(mut self, watermark: Vec<u8>) -> Self {
        self.watermark = Some(watermark);
        self
    }

    pub fn with_params(mut self, params: RequestParams) -> Self {
        self.params = params;
        self
    }
}
