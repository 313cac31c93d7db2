use std::path::PathBuf;

use color_eyre::eyre::Error;
use rft_mesh::ObjFile;
use rft_solver::Tracer;

use crate::{
    config::SimulationConfig,
    export::{
        ReceiverRecord,
        Report,
        WaveRecord,
    },
    files::{
        AppFiles,
        read_config,
    },
};

#[derive(Clone, Debug, clap::Parser)]
pub struct Args {
    /// Scene geometry as Wavefront OBJ
    pub mesh: PathBuf,

    /// Configuration file. Defaults to `config.toml` in the user's config
    /// directory, which is created if missing.
    #[clap(short, long)]
    pub config: Option<PathBuf>,

    /// Write the JSON report here instead of stdout
    #[clap(short, long)]
    pub output: Option<PathBuf>,

    /// Override the tracer depth
    #[clap(short, long)]
    pub depth: Option<usize>,

    /// Only report received fields, not every traced wave
    #[clap(long)]
    pub receivers_only: bool,
}

impl Args {
    pub fn run(self) -> Result<(), Error> {
        let mut config: SimulationConfig = if let Some(path) = &self.config {
            read_config(path)?
        }
        else {
            AppFiles::open()?.read_config_or_create()?
        };
        if let Some(depth) = self.depth {
            config.tracer.depth = depth;
        }

        let materials = config.material_table();
        let faces = ObjFile::from_file(&self.mesh)?.faces(&materials, config.mesh.material_mapping())?;
        tracing::info!(mesh = %self.mesh.display(), faces = faces.len(), "Loaded scene");

        let seeds = config.transmitter()?.transmit(&config.transmit)?;
        let tracer = Tracer::new(faces.as_slice(), config.tracer_config())?;
        let paths = tracer.trace_all(seeds)?;

        let mut report = Report::default();

        for receiver in &config.receivers {
            let field = config.receiver(receiver)?.receive(&paths)?;
            tracing::info!(name = %receiver.name, magnitude = field.norm(), "Received");
            report
                .receivers
                .push(ReceiverRecord::new(&receiver.name, receiver.position, field));
        }

        if !self.receivers_only {
            report.waves = paths
                .iter()
                .enumerate()
                .flat_map(|(seed, path)| path.iter().map(move |wave| WaveRecord::new(seed, &wave)))
                .collect();
        }

        report.write(self.output.as_deref())
    }
}
