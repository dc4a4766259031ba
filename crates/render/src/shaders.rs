/// Default WGSL ray marcher: a bobbing sphere over a ground plane.
///
/// Any replacement shader must provide `vs_main`/`fs_main` and declare its
/// inputs as a uniform struct in bind group 0; members it omits are simply
/// never published.
pub const DEFAULT_SHADER: &str = r#"
struct Scene {
    u_resolution: vec2<u32>,
    u_time: f32,
    u_camera_pos: vec3<f32>,
    u_camera_rot: vec2<f32>,
};

@group(0) @binding(0)
var<uniform> scene: Scene;

@vertex
fn vs_main(@builtin(vertex_index) index: u32) -> @builtin(position) vec4<f32> {
    var corners = array<vec2<f32>, 6>(
        vec2<f32>(-1.0, -1.0),
        vec2<f32>(1.0, -1.0),
        vec2<f32>(1.0, 1.0),
        vec2<f32>(-1.0, -1.0),
        vec2<f32>(1.0, 1.0),
        vec2<f32>(-1.0, 1.0),
    );
    return vec4<f32>(corners[index], 0.0, 1.0);
}

fn rotate2(v: vec2<f32>, a: f32) -> vec2<f32> {
    let c = cos(a);
    let s = sin(a);
    return vec2<f32>(c * v.x + s * v.y, c * v.y - s * v.x);
}

fn scene_sdf(p: vec3<f32>) -> f32 {
    let bob = sin(scene.u_time) * 0.25;
    let sphere = length(p - vec3<f32>(0.0, bob, 0.0)) - 1.0;
    let ground = p.y + 1.5;
    return min(sphere, ground);
}

fn scene_normal(p: vec3<f32>) -> vec3<f32> {
    let e = vec2<f32>(0.001, 0.0);
    return normalize(vec3<f32>(
        scene_sdf(p + e.xyy) - scene_sdf(p - e.xyy),
        scene_sdf(p + e.yxy) - scene_sdf(p - e.yxy),
        scene_sdf(p + e.yyx) - scene_sdf(p - e.yyx),
    ));
}

const SKY: vec3<f32> = vec3<f32>(0.05, 0.07, 0.12);

@fragment
fn fs_main(@builtin(position) frag: vec4<f32>) -> @location(0) vec4<f32> {
    let res = vec2<f32>(scene.u_resolution);
    let uv = vec2<f32>(
        (2.0 * frag.x - res.x) / res.y,
        (res.y - 2.0 * frag.y) / res.y,
    );

    // rot.x carries the pitch term, rot.y the yaw accumulator.
    let rot = scene.u_camera_rot;
    var rd = normalize(vec3<f32>(uv, 1.0));
    let pitched = rotate2(vec2<f32>(rd.y, rd.z), -rot.x);
    rd = vec3<f32>(rd.x, pitched.x, pitched.y);
    let yawed = rotate2(vec2<f32>(rd.x, rd.z), rot.y);
    rd = vec3<f32>(yawed.x, rd.y, yawed.y);

    let ro = scene.u_camera_pos;
    var t = 0.0;
    var hit = false;
    for (var i = 0; i < 128; i = i + 1) {
        let d = scene_sdf(ro + rd * t);
        if d < 0.001 {
            hit = true;
            break;
        }
        t = t + d;
        if t > 100.0 {
            break;
        }
    }

    var color = SKY;
    if hit {
        let p = ro + rd * t;
        let n = scene_normal(p);
        let light = normalize(vec3<f32>(0.5, 0.8, -0.4));
        let diffuse = max(dot(n, light), 0.0);
        color = vec3<f32>(0.55, 0.65, 0.8) * (0.15 + 0.85 * diffuse);
        color = mix(color, SKY, 1.0 - exp(-0.0005 * t * t));
    }
    return vec4<f32>(color, 1.0);
}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::uniforms::{UniformBlock, U_CAMERA_POS, U_CAMERA_ROT, U_RESOLUTION, U_TIME};

    #[test]
    fn default_shader_declares_the_full_contract() {
        let block = UniformBlock::from_wgsl(DEFAULT_SHADER).unwrap();
        let names: Vec<&str> = block.names().collect();
        assert!(names.contains(&U_RESOLUTION));
        assert!(names.contains(&U_TIME));
        assert!(names.contains(&U_CAMERA_POS));
        assert!(names.contains(&U_CAMERA_ROT));
    }
}
