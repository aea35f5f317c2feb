use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use tumble_world::{Body, ContactMaterial, Material, Shape, WorldBuilder, WorldConfig, vec3};

#[derive(Parser, Debug)]
#[command(name = "falling_sphere", about = "Drop a sphere onto a plane and print its height each step")]
struct Opts {
    /// Number of fixed steps to run
    #[arg(long, default_value_t = 120)]
    steps: u32,

    /// Starting height of the sphere
    #[arg(long, default_value_t = 5.0)]
    height: f32,

    /// Restitution between sphere and ground
    #[arg(long, default_value_t = 0.5)]
    bounce: f32,

    /// Optional JSON world config
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print only the final state
    #[arg(long, action = ArgAction::SetTrue)]
    quiet: bool,
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn main() -> Result<()> {
    let opts = Opts::parse();
    let config = match &opts.config {
        Some(path) => {
            let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
            WorldConfig::from_json_str(&text)?
        }
        None => WorldConfig::default(),
    };
    let dt = config.default_dt;
    let mut world = WorldBuilder::from_config(config).build();

    let mut rubber = Material::new("rubber");
    let mut ground = Material::new("ground");
    world.add_contact_material(&mut rubber, &mut ground, ContactMaterial::new(0.4, opts.bounce));

    let mut floor = Body::fixed(Shape::Plane, vec3(0.0, 0.0, 0.0));
    floor.material = ground.id;
    world.add_body(floor)?;
    let mut ball = Body::dynamic(1.0, Shape::Sphere { r: 0.5 }, vec3(0.0, opts.height, 0.0));
    ball.material = rubber.id;
    let ball = world.add_body(ball)?;

    let mut bounces = 0;
    world.on_contact(move |e| {
        if let tumble_world::ContactEvent::Begin { .. } = e {
            bounces += 1;
            println!("touchdown #{bounces}");
        }
    });

    for _ in 0..opts.steps {
        let stats = world.step(Some(dt)).context("world step")?;
        if !opts.quiet {
            let b = world.body(ball).context("ball vanished")?;
            println!(
                "step {:4}  t={:.3}  y={:+.4}  vy={:+.4}  pairs={} contacts={}",
                world.step_number(), world.time(), b.position.y, b.velocity.y, stats.pairs_tested, stats.contacts
            );
        }
    }

    let b = world.body(ball).context("ball vanished")?;
    println!("final y={:.4} after {} steps, hash {}", b.position.y, world.step_number(), hex(&world.step_hash()));
    Ok(())
}
