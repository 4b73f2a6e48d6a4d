/// Building-analysis domain logic shared by the HTTP handler and tests:
///
/// 1. Build the instruction block pinning the caller-supplied address
/// 2. Normalize the provider payload (direct or enveloped shape)
/// 3. Range-validate the result before it is returned to the caller
use crate::errors::AppError;
use crate::models::CombinedMatrix;
use serde_json::Value;

/// Instruction template sent as the text part of the multimodal message.
///
/// Embeds the machine-readable reference schema and one fully worked
/// example so the model has the exact target shape. `{address}` is
/// substituted in three places; the model is explicitly told to echo the
/// supplied address rather than read one off the imagery.
const INSTRUCTION_TEMPLATE: &str = r#"All of these images describe the building located at: {address}

The first image is the top-down view, the next images are of the street view. Based on these images, tell me the # floors, window-to-wall ratio, architectural style, estimated building age, % mix of facade materials, and % mix of program.

IMPORTANT: You MUST use "{address}" as the address field in your response. Do not try to determine the address from the images.

Output each one of these categories into a combined matrix JSON based on the attached reference:

{
  "version": "1.1",
  "description": "Reference format for building analysis outputs from images.",
  "schema": {
    "combined_matrix": {
      "address": "string. Use the exact address provided above: {address}",
      "num_floors": "integer. Total number of above-grade floors estimated from the images.",
      "window_to_wall_ratio": "number between 0 and 1. Estimated ratio of glazed area to total facade area.",
      "architectural_style": "string. Must be one of: 'prewar_masonry', 'art_deco', 'modernist', 'brutalist', 'postmodern', 'postwar_commercial', 'contemporary_glass', 'industrial_loft', 'townhouse_rowhouse', 'vernacular_other', 'unknown'. Choose the closest fit.",
      "architectural_style_add": "string. Short free-text explanation of key stylistic qualities",
      "estimated_building_age": "string. Either a single year like '1975' or a range like '1960-1980'.",
      "facade_material_mix": [
        {
          "material": "string. Must be one of: 'glass', 'brick', 'stone', 'concrete', 'metal_panel', 'composite_panel', 'stucco', 'wood', 'terracotta', 'other'.",
          "percent": "number between 0 and 100. Estimated percentage of total visible facade area. All items together should sum to ~100."
        }
      ],
      "program_mix": [
        {
          "program": "string. Must be one of: 'residential', 'office', 'retail', 'hotel', 'industrial', 'parking', 'institutional', 'civic', 'community', 'mechanical_other', 'unknown'.",
          "percent": "number between 0 and 100. Estimated percentage of total building area for this program. All items together should sum to ~100."
        }
      ],
      "confidence_scores": {
        "num_floors": "number between 0 and 1. Model confidence in num_floors estimate.",
        "window_to_wall_ratio": "number between 0 and 1.",
        "architectural_style": "number between 0 and 1.",
        "estimated_building_age": "number between 0 and 1.",
        "facade_material_mix": "number between 0 and 1.",
        "program_mix": "number between 0 and 1."
      },
      "notes": "string. Short free-text explanation of key assumptions, uncertainties, and anything unusual about the building."
    }
  },
  "example_output": {
    "combined_matrix": {
      "address": "123 Example Street, New York, NY 10001, USA",
      "num_floors": 12,
      "window_to_wall_ratio": 0.65,
      "architectural_style": "contemporary_glass",
      "estimated_building_age": "2000-2010",
      "facade_material_mix": [
        {
          "material": "glass",
          "percent": 70
        },
        {
          "material": "metal_panel",
          "percent": 20
        },
        {
          "material": "stone",
          "percent": 10
        }
      ],
      "program_mix": [
        {
          "program": "office",
          "percent": 85
        },
        {
          "program": "retail",
          "percent": 10
        },
        {
          "program": "mechanical_other",
          "percent": 5
        }
      ],
      "confidence_scores": {
        "num_floors": 0.95,
        "window_to_wall_ratio": 0.8,
        "architectural_style": 0.7,
        "estimated_building_age": 0.6,
        "facade_material_mix": 0.75,
        "program_mix": 0.7
      },
      "notes": "Ground floor appears to be retail with double-height storefront glazing. Upper floors show typical office floorplates with curtain wall. Building age is estimated based on facade detailing and glazing type; exact year may differ."
    }
  }
}
"#;

/// Builds the full natural-language instruction block for one address.
pub fn build_instruction_block(address: &str) -> String {
    INSTRUCTION_TEMPLATE.replace("{address}", address)
}

/// Enveloped provider shape: the model sometimes echoes the instruction
/// wrapper (`version`/`description`/`schema`) around the matrix instead of
/// returning it bare.
#[derive(Debug, serde::Deserialize)]
struct AnalysisEnvelope {
    schema: CombinedMatrix,
}

/// Normalizes a parsed provider payload to the bare `combined_matrix` form
/// and range-validates it.
///
/// The direct shape is tried first, the enveloped shape second; when neither
/// matches, the error carries both parse failures plus the raw payload so
/// the mismatch can be diagnosed from the response alone.
pub fn normalize_analysis_payload(raw: Value) -> Result<CombinedMatrix, AppError> {
    let matrix = match serde_json::from_value::<CombinedMatrix>(raw.clone()) {
        Ok(direct) => direct,
        Err(direct_err) => match serde_json::from_value::<AnalysisEnvelope>(raw.clone()) {
            Ok(envelope) => envelope.schema,
            Err(envelope_err) => {
                return Err(AppError::Validation {
                    errors: vec![
                        format!("direct shape: {}", direct_err),
                        format!("enveloped shape: {}", envelope_err),
                    ],
                    raw,
                });
            }
        },
    };

    let violations = matrix.combined_matrix.validate();
    if !violations.is_empty() {
        return Err(AppError::Validation {
            errors: violations,
            raw,
        });
    }

    Ok(matrix)
}
