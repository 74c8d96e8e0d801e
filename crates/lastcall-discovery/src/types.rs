//! Wire types for the Gemini `generateContent` endpoint.
//!
//! Only the fields the pipeline reads are modelled. Everything else in the
//! response is ignored by serde.

use lastcall_core::GeoPosition;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentRequest<'a> {
    pub contents: Vec<Content<'a>>,
    pub tools: Vec<Tool>,
    pub tool_config: ToolConfig,
}

#[derive(Debug, Serialize)]
pub(crate) struct Content<'a> {
    pub role: &'a str,
    pub parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
pub(crate) struct RequestPart<'a> {
    pub text: &'a str,
}

/// Enables Google Maps grounding. Serialises as `{"googleMaps":{}}`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Tool {
    pub google_maps: GoogleMaps,
}

#[derive(Debug, Serialize)]
pub(crate) struct GoogleMaps {}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ToolConfig {
    pub retrieval_config: RetrievalConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RetrievalConfig {
    pub lat_lng: LatLng,
}

#[derive(Debug, Serialize)]
pub(crate) struct LatLng {
    pub latitude: f64,
    pub longitude: f64,
}

impl<'a> GenerateContentRequest<'a> {
    /// A single-turn user prompt with map grounding anchored at `position`.
    pub(crate) fn grounded(prompt: &'a str, position: GeoPosition) -> Self {
        Self {
            contents: vec![Content {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
            tools: vec![Tool {
                google_maps: GoogleMaps {},
            }],
            tool_config: ToolConfig {
                retrieval_config: RetrievalConfig {
                    lat_lng: LatLng {
                        latitude: position.latitude(),
                        longitude: position.longitude(),
                    },
                },
            },
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Candidate {
    #[serde(default)]
    pub content: Option<CandidateContent>,
    #[serde(default)]
    pub grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ResponsePart {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GroundingMetadata {
    #[serde(default)]
    pub grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct GroundingChunk {
    #[serde(default)]
    pub maps: Option<MapsChunk>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MapsChunk {
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub place_id: Option<String>,
}

/// A place reference the upstream attached to its answer.
///
/// Exposed for diagnostics only. Its order drifts from the textual list, so
/// it is never used to build outlet links.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroundingPlace {
    pub title: Option<String>,
    pub uri: Option<String>,
    pub place_id: Option<String>,
}

/// Raw upstream answer: flattened text plus any grounding places.
#[derive(Debug, Clone)]
pub struct DiscoveryAnswer {
    pub text: String,
    pub grounding: Vec<GroundingPlace>,
}

impl From<GenerateContentResponse> for DiscoveryAnswer {
    fn from(response: GenerateContentResponse) -> Self {
        let Some(first) = response.candidates.into_iter().next() else {
            return Self {
                text: String::new(),
                grounding: Vec::new(),
            };
        };

        let text = first
            .content
            .map(|c| {
                c.parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<String>()
            })
            .unwrap_or_default();

        let grounding = first
            .grounding_metadata
            .map(|m| {
                m.grounding_chunks
                    .into_iter()
                    .filter_map(|chunk| chunk.maps)
                    .map(|maps| GroundingPlace {
                        title: maps.title,
                        uri: maps.uri,
                        place_id: maps.place_id,
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self { text, grounding }
    }
}
