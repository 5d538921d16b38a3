/// WGSL shader code for camera image undistortion
///
/// The fragment stage uses the distortion texture as an indirection table:
/// each texel holds the normalized raw-image coordinate to sample (u in R,
/// v in G). Lookups outside (0, 1) have no source pixel and come out black.

/// Binding slot of the raw grayscale image (`raw_data`)
pub const RAW_DATA_BINDING: u32 = 3;
/// Binding slot of the RGBA32F lookup texture (`distortion`)
pub const DISTORTION_BINDING: u32 = 1;
pub const RAW_SAMPLER_BINDING: u32 = 4;
pub const DISTORTION_SAMPLER_BINDING: u32 = 2;

pub const VERTEX_ENTRY: &str = "vs_main";
pub const FRAGMENT_ENTRY: &str = "fs_main";

/// Passthrough vertex stage + texture-indirection fragment stage
pub const UNDISTORT_SHADER: &str = r#"
// ========== Vertex Shader ==========

struct VertexInput {
    @location(0) position: vec2<f32>,
    @location(1) color: vec4<f32>,
    @location(2) tex_coords: vec2<f32>,
}

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) color: vec4<f32>,
    @location(1) distortion_lookup: vec2<f32>,
}

// Identity transform: color and texture coordinate pass straight through
@vertex
fn vs_main(input: VertexInput) -> VertexOutput {
    var output: VertexOutput;
    output.clip_position = vec4<f32>(input.position, 0.0, 1.0);
    output.color = input.color;
    output.distortion_lookup = input.tex_coords;
    return output;
}

// ========== Fragment Shader ==========

@group(0) @binding(1)
var distortion: texture_2d<f32>;

@group(0) @binding(2)
var distortion_sampler: sampler;

@group(0) @binding(3)
var raw_data: texture_2d<f32>;

@group(0) @binding(4)
var raw_sampler: sampler;

@fragment
fn fs_main(input: VertexOutput) -> @location(0) vec4<f32> {
    let index = textureSampleLevel(distortion, distortion_sampler, input.distortion_lookup, 0.0);

    if (index.r > 0.0 && index.r < 1.0 && index.g > 0.0 && index.g < 1.0) {
        // Lookup rows run opposite to raw image rows
        return textureSampleLevel(raw_data, raw_sampler, vec2<f32>(index.r, 1.0 - index.g), 0.0);
    }

    return vec4<f32>(0.0, 0.0, 0.0, 1.0);
}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use naga::valid::{Capabilities, ValidationFlags, Validator};
    use naga::ShaderStage;

    fn parse() -> naga::Module {
        naga::front::wgsl::parse_str(UNDISTORT_SHADER)
            .unwrap_or_else(|err| panic!("{}", err.emit_to_string(UNDISTORT_SHADER)))
    }

    #[test]
    fn test_shader_validates() {
        let module = parse();
        Validator::new(ValidationFlags::all(), Capabilities::empty())
            .validate(&module)
            .unwrap();
    }

    #[test]
    fn test_entry_points_match_constants() {
        let module = parse();
        let stages: Vec<(&str, ShaderStage)> = module
            .entry_points
            .iter()
            .map(|entry| (entry.name.as_str(), entry.stage))
            .collect();

        assert_eq!(
            stages,
            vec![
                (VERTEX_ENTRY, ShaderStage::Vertex),
                (FRAGMENT_ENTRY, ShaderStage::Fragment),
            ]
        );
    }

    #[test]
    fn test_binding_slots_match_constants() {
        let module = parse();
        let binding_of = |name: &str| {
            module
                .global_variables
                .iter()
                .find(|(_, var)| var.name.as_deref() == Some(name))
                .and_then(|(_, var)| var.binding.clone())
                .map(|binding| (binding.group, binding.binding))
        };

        assert_eq!(binding_of("raw_data"), Some((0, RAW_DATA_BINDING)));
        assert_eq!(binding_of("distortion"), Some((0, DISTORTION_BINDING)));
        assert_eq!(binding_of("raw_sampler"), Some((0, RAW_SAMPLER_BINDING)));
        assert_eq!(
            binding_of("distortion_sampler"),
            Some((0, DISTORTION_SAMPLER_BINDING))
        );
    }
}
