use log::{info, warn};

use crate::config::LoaderConfig;
use crate::data::{Grid, GridData, LoadRequest, OsmDocument};
use crate::errors::Result;
use crate::fetch::Fetcher;

use super::project_ways::project_highways;
use super::Etl;

pub const ETL_NAME: &str = "grid_loader";

/// Fetches an OSM extract, builds a [`Grid`] from it and projects its
/// highways.
pub struct GridLoaderEtl<'a> {
    config: &'a LoaderConfig,
    fetcher: &'a dyn Fetcher,
    request: &'a LoadRequest,
}

impl<'a> GridLoaderEtl<'a> {
    pub fn new(config: &'a LoaderConfig, fetcher: &'a dyn Fetcher, request: &'a LoadRequest) -> Self {
        GridLoaderEtl {
            config,
            fetcher,
            request,
        }
    }

    fn apply_metadata(&self, grid: &mut Grid) {
        let initial = &self.request.initial_grid_data;
        match initial.name.as_deref() {
            Some(name) if !name.is_empty() => grid.set_name(name),
            _ => grid.set_name(self.config.default_name.as_str()),
        }
        match initial.id {
            Some(id) if id != 0 => grid.set_id(id),
            _ => grid.set_id(self.config.default_id),
        }
        grid.set_is_area(initial.is_area.unwrap_or(self.config.default_is_area));
    }
}

impl Etl for GridLoaderEtl<'_> {
    type Input = OsmDocument;
    type Output = Grid;
    type Loaded = GridData;

    fn etl_name(&self) -> &str {
        ETL_NAME
    }

    fn extract(&mut self) -> Result<Self::Input> {
        let body = self.fetcher.fetch(&self.request.data_url)?;
        let document: OsmDocument = serde_json::from_slice(&body)?;
        info!(etl_name = ETL_NAME, url = self.request.data_url.as_str(), elements = document.elements.len(); "Data fetched and parsed");
        Ok(document)
    }

    fn transform(&mut self, input: Self::Input) -> Result<Self::Output> {
        let mut grid = Grid::from_osm_response(input.elements);
        self.apply_metadata(&mut grid);

        // Without any coordinates there is nothing to calibrate against, so
        // the grid is handed back with zeroed bounds and no way points.
        if grid.bounds.is_empty() {
            warn!(etl_name = ETL_NAME, nodes = grid.nodes.len(); "No node has coordinates, skipping projection");
            grid.way_point_count = 0;
            return Ok(grid);
        }

        let projector = grid.projector(self.config.projection_scale)?;
        let projection = project_highways(&grid, &projector, self.config.missing_node_policy)?;
        grid.way_point_count = projection.way_point_count;

        info!(
            etl_name = ETL_NAME,
            nodes = grid.nodes.len(),
            projected_ways = projection.ways.len(),
            way_points = projection.way_point_count,
            skipped_refs = projection.skipped_refs;
            "Processed and projected ways"
        );
        Ok(grid)
    }

    fn load(&mut self, output: Self::Output) -> Result<Self::Loaded> {
        Ok(GridData::from(output))
    }
}
