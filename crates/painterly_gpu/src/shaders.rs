//! WGSL shaders for the painterly pipeline.
//!
//! Three fullscreen passes:
//! - Structure tensor: Sobel derivatives of the display pass's color output
//! - Painterly: anisotropic sector sampling over the reference image
//! - Blit: gamma-encoding copy used when the effect is toggled off
//!
//! All passes draw a single fullscreen triangle generated from the vertex
//! index, so no vertex buffers are bound. Constants mirror
//! `painterly_core::kernel` and `painterly_core::tensor`; the two
//! implementations must agree.

/// WGSL shader for the structure-tensor pass.
///
/// Computes per-channel Sobel derivatives of the scene color with clamped
/// borders and writes (Jxx, Jyy, Jxy, 1) per pixel.
pub const TENSOR_SHADER: &str = r#"
@group(0) @binding(0) var scene_tex: texture_2d<f32>;

@vertex
fn vs_main(@builtin(vertex_index) index: u32) -> @builtin(position) vec4<f32> {
    let uv = vec2<f32>(f32((index << 1u) & 2u), f32(index & 2u));
    return vec4<f32>(uv * 2.0 - 1.0, 0.0, 1.0);
}

fn load_clamped(coord: vec2<i32>) -> vec3<f32> {
    let dims = vec2<i32>(textureDimensions(scene_tex));
    let clamped = clamp(coord, vec2<i32>(0), dims - vec2<i32>(1));
    return textureLoad(scene_tex, clamped, 0).rgb;
}

@fragment
fn fs_main(@builtin(position) position: vec4<f32>) -> @location(0) vec4<f32> {
    let coord = vec2<i32>(position.xy);

    let tl = load_clamped(coord + vec2<i32>(-1, -1));
    let tc = load_clamped(coord + vec2<i32>(0, -1));
    let tr = load_clamped(coord + vec2<i32>(1, -1));
    let ml = load_clamped(coord + vec2<i32>(-1, 0));
    let mr = load_clamped(coord + vec2<i32>(1, 0));
    let bl = load_clamped(coord + vec2<i32>(-1, 1));
    let bc = load_clamped(coord + vec2<i32>(0, 1));
    let br = load_clamped(coord + vec2<i32>(1, 1));

    // Per-channel Sobel derivatives.
    let gx = (tr + 2.0 * mr + br) - (tl + 2.0 * ml + bl);
    let gy = (bl + 2.0 * bc + br) - (tl + 2.0 * tc + tr);

    return vec4<f32>(dot(gx, gx), dot(gy, gy), dot(gx, gy), 1.0);
}
"#;

/// WGSL shader for the painterly (anisotropic Kuwahara) pass.
pub const PAINTERLY_SHADER: &str = r#"
const SECTOR_COUNT: u32 = 8u;
const SUBSECTOR_STEP: f32 = 0.19634954;
const TAU: f32 = 6.2831853;
const KERNEL_ALPHA: f32 = 25.0;
const WEIGHT_ETA: f32 = 0.1;
const WEIGHT_LAMBDA: f32 = 0.5;
const TENSOR_EPSILON: f32 = 1e-7;
const MIN_SECTOR_WEIGHT: f32 = 1e-6;

struct PainterlyUniforms {
    resolution: vec4<f32>,
    radius: u32,
    _pad0: u32,
    _pad1: u32,
    _pad2: u32,
};

@group(0) @binding(0) var<uniform> params: PainterlyUniforms;
@group(0) @binding(1) var tensor_tex: texture_2d<f32>;
@group(0) @binding(2) var reference_tex: texture_2d<f32>;
@group(0) @binding(3) var reference_sampler: sampler;

@vertex
fn vs_main(@builtin(vertex_index) index: u32) -> @builtin(position) vec4<f32> {
    let uv = vec2<f32>(f32((index << 1u) & 2u), f32(index & 2u));
    return vec4<f32>(uv * 2.0 - 1.0, 0.0, 1.0);
}

fn from_linear(rgb: vec3<f32>) -> vec3<f32> {
    let cutoff = rgb < vec3<f32>(0.0031308);
    let higher = vec3<f32>(1.055) * pow(rgb, vec3<f32>(1.0 / 2.4)) - vec3<f32>(0.055);
    let lower = rgb * vec3<f32>(12.92);
    return select(higher, lower, cutoff);
}

fn sample_reference(frag_coord: vec2<f32>, offset: vec2<f32>) -> vec3<f32> {
    let uv = (frag_coord + offset) * params.resolution.zw;
    return textureSampleLevel(reference_tex, reference_sampler, uv, 0.0).rgb;
}

struct OrientationInfo {
    direction: vec2<f32>,
    anisotropy: f32,
};

fn dominant_orientation(tensor: vec3<f32>) -> OrientationInfo {
    let jxx = tensor.x;
    let jyy = tensor.y;
    let jxy = tensor.z;

    let trace = jxx + jyy;
    let det = jxx * jyy - jxy * jxy;
    let disc = sqrt(max(trace * trace * 0.25 - det, 0.0));
    let lambda1 = trace * 0.5 + disc;
    let lambda2 = trace * 0.5 - disc;

    let jxy_strength = abs(jxy) / (abs(jxx) + abs(jyy) + abs(jxy) + TENSOR_EPSILON);

    var info: OrientationInfo;
    info.direction = vec2<f32>(0.0, 1.0);
    if (jxy_strength > 0.0) {
        info.direction = normalize(vec2<f32>(-jxy, jxx - lambda1));
    }
    info.anisotropy = (lambda1 - lambda2) / (lambda1 + lambda2 + TENSOR_EPSILON);
    return info;
}

struct SectorResult {
    average: vec3<f32>,
    variance: f32,
};

fn sector_statistics(
    frag_coord: vec2<f32>,
    warp: mat2x2<f32>,
    angle: f32,
    radius: u32,
    center: vec3<f32>,
) -> SectorResult {
    var color_sum = vec3<f32>(0.0);
    var squared_sum = vec3<f32>(0.0);
    var weight_sum = 0.0;

    for (var r = 1u; r <= radius; r = r + 1u) {
        for (var s = 0; s < 5; s = s + 1) {
            let sub = angle + (f32(s) - 2.0) * SUBSECTOR_STEP;
            let offset = f32(r) * vec2<f32>(cos(sub), sin(sub));
            let warped = warp * offset;

            let color = sample_reference(frag_coord, warped);
            let poly = (warped.x + WEIGHT_ETA) - WEIGHT_LAMBDA * warped.y * warped.y;
            let weight = max(poly * poly, 0.0);

            color_sum += color * weight;
            squared_sum += color * color * weight;
            weight_sum += weight;
        }
    }

    var result: SectorResult;
    if (weight_sum < MIN_SECTOR_WEIGHT) {
        // Degenerate sector: report the center color with maximal variance
        // so it never wins selection over a sector that saw real samples.
        result.average = center;
        result.variance = 3.0e38;
        return result;
    }

    result.average = color_sum / weight_sum;
    let variance_rgb = squared_sum / weight_sum - result.average * result.average;
    result.variance = dot(variance_rgb, vec3<f32>(0.299, 0.587, 0.114));
    return result;
}

@fragment
fn fs_main(@builtin(position) position: vec4<f32>) -> @location(0) vec4<f32> {
    let frag_coord = position.xy;
    let tensor = textureLoad(tensor_tex, vec2<i32>(frag_coord), 0).rgb;

    let info = dominant_orientation(tensor);
    let scale_x = KERNEL_ALPHA / (info.anisotropy + KERNEL_ALPHA);
    let scale_y = (info.anisotropy + KERNEL_ALPHA) / KERNEL_ALPHA;
    let warp = mat2x2<f32>(
        vec2<f32>(info.direction.x * scale_x, info.direction.y * scale_y),
        vec2<f32>(-info.direction.y * scale_x, info.direction.x * scale_y),
    );

    let center = sample_reference(frag_coord, vec2<f32>(0.0, 0.0));

    var best = sector_statistics(frag_coord, warp, 0.0, params.radius, center);
    for (var i = 1u; i < SECTOR_COUNT; i = i + 1u) {
        let angle = f32(i) * TAU / f32(SECTOR_COUNT);
        let candidate = sector_statistics(frag_coord, warp, angle, params.radius, center);
        if (candidate.variance < best.variance) {
            best = candidate;
        }
    }

    return vec4<f32>(from_linear(best.average), 1.0);
}
"#;

/// WGSL shader for the gamma-encoding blit used when the effect is off.
pub const BLIT_SHADER: &str = r#"
@group(0) @binding(0) var src_tex: texture_2d<f32>;

@vertex
fn vs_main(@builtin(vertex_index) index: u32) -> @builtin(position) vec4<f32> {
    let uv = vec2<f32>(f32((index << 1u) & 2u), f32(index & 2u));
    return vec4<f32>(uv * 2.0 - 1.0, 0.0, 1.0);
}

fn from_linear(rgb: vec3<f32>) -> vec3<f32> {
    let cutoff = rgb < vec3<f32>(0.0031308);
    let higher = vec3<f32>(1.055) * pow(rgb, vec3<f32>(1.0 / 2.4)) - vec3<f32>(0.055);
    let lower = rgb * vec3<f32>(12.92);
    return select(higher, lower, cutoff);
}

@fragment
fn fs_main(@builtin(position) position: vec4<f32>) -> @location(0) vec4<f32> {
    let color = textureLoad(src_tex, vec2<i32>(position.xy), 0);
    return vec4<f32>(from_linear(color.rgb), color.a);
}
"#;

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_wgsl(label: &str, source: &str) {
        naga::front::wgsl::parse_str(source).unwrap_or_else(|error| {
            panic!(
                "WGSL parse failed for {label}: {}",
                error.emit_to_string(source)
            )
        });
    }

    #[test]
    fn test_wgsl_sources_parse() {
        parse_wgsl("tensor", TENSOR_SHADER);
        parse_wgsl("painterly", PAINTERLY_SHADER);
        parse_wgsl("blit", BLIT_SHADER);
    }
}
