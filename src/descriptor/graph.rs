//! Loading the build graph of a multi-module project.
//!
//! The graph starts at a root descriptor and follows its `modules` entries
//! recursively. A module entry names a directory containing a descriptor
//! file, or a descriptor file directly. Projects are listed in pre-order, so
//! the root always comes first and every parent precedes its modules.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use log::debug;

use super::{marshal, ProjectDescriptor, ProjectId};
use crate::defaults::find_descriptor;
use crate::error::{Error, Result};

/// A descriptor together with the file it was read from.
#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    pub id: ProjectId,
    pub path: PathBuf,
    pub descriptor: ProjectDescriptor,
}

/// The projects taking part in one build.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectGraph {
    projects: Vec<Project>,
}

impl ProjectGraph {
    /// Loads the graph rooted at `root_descriptor`.
    ///
    /// # Errors
    ///
    /// - `Error::Descriptor` if a descriptor is missing, unparseable or has
    ///   no group id, or two projects share an identity.
    /// - `Error::CycleDetected` if module declarations form a cycle.
    pub fn load(root_descriptor: &Path) -> Result<Self> {
        let mut loader = Loader::default();
        loader.visit(root_descriptor)?;
        debug!(
            "Loaded {} project(s) from {}",
            loader.projects.len(),
            root_descriptor.display()
        );
        Ok(Self {
            projects: loader.projects,
        })
    }

    /// Builds a graph from already loaded projects. The first project is the
    /// root.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidArgument` when `projects` is empty.
    pub fn from_projects(projects: Vec<Project>) -> Result<Self> {
        if projects.is_empty() {
            return Err(Error::InvalidArgument {
                message: "a project graph needs at least one project".to_string(),
            });
        }
        Ok(Self { projects })
    }

    pub fn root(&self) -> &Project {
        &self.projects[0]
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    /// The descriptors in graph order.
    pub fn descriptors(&self) -> Vec<ProjectDescriptor> {
        self.projects
            .iter()
            .map(|project| project.descriptor.clone())
            .collect()
    }

    pub fn find(&self, id: &ProjectId) -> Option<&Project> {
        self.projects.iter().find(|project| &project.id == id)
    }
}

#[derive(Default)]
struct Loader {
    projects: Vec<Project>,
    seen: HashSet<ProjectId>,
    stack: Vec<PathBuf>,
}

impl Loader {
    fn visit(&mut self, path: &Path) -> Result<()> {
        let canonical = path.canonicalize().map_err(|e| Error::Descriptor {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        if let Some(start) = self.stack.iter().position(|p| p == &canonical) {
            let cycle = self.stack[start..]
                .iter()
                .chain(std::iter::once(&canonical))
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(" -> ");
            return Err(Error::CycleDetected { cycle });
        }

        let descriptor = marshal::parse(path)?;
        let id = descriptor.id().ok_or_else(|| Error::Descriptor {
            path: path.to_path_buf(),
            message: format!(
                "Project '{}' declares no groupId and has no parent",
                descriptor.artifact_id
            ),
        })?;
        if !self.seen.insert(id.clone()) {
            return Err(Error::Descriptor {
                path: path.to_path_buf(),
                message: format!("Project {} is declared more than once", id),
            });
        }

        let base = path.parent().unwrap_or_else(|| Path::new("."));
        let modules = descriptor
            .modules
            .iter()
            .map(|module| module_descriptor(base, module))
            .collect::<Result<Vec<_>>>()?;

        self.projects.push(Project {
            id,
            path: path.to_path_buf(),
            descriptor,
        });

        self.stack.push(canonical);
        for module in modules {
            self.visit(&module)?;
        }
        self.stack.pop();
        Ok(())
    }
}

fn module_descriptor(base: &Path, module: &str) -> Result<PathBuf> {
    let target = base.join(module);
    if target.is_file() {
        return Ok(target);
    }
    find_descriptor(&target).ok_or_else(|| Error::Descriptor {
        path: target,
        message: format!("Module '{}' has no descriptor", module),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &Path, relative: &str, content: &str) -> PathBuf {
        let path = dir.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_multi_module_graph_in_pre_order() {
        let temp = TempDir::new().unwrap();
        let root = write(
            temp.path(),
            "pom.yaml",
            "groupId: com.example\nartifactId: parent\nversion: '1'\nmodules: [api, app]\n",
        );
        write(
            temp.path(),
            "api/pom.yaml",
            "artifactId: api\nparent: {groupId: com.example, artifactId: parent}\n",
        );
        write(
            temp.path(),
            "app/pom.json",
            r#"{"groupId": "com.example", "artifactId": "app"}"#,
        );

        let graph = ProjectGraph::load(&root).unwrap();
        let ids: Vec<String> = graph.projects().iter().map(|p| p.id.to_string()).collect();
        assert_eq!(ids, ["com.example:parent", "com.example:api", "com.example:app"]);
        assert_eq!(graph.root().path, root);
        assert!(graph.find(&ProjectId::new("com.example", "api")).is_some());
        assert_eq!(graph.descriptors().len(), 3);
    }

    #[test]
    fn test_module_can_name_descriptor_file() {
        let temp = TempDir::new().unwrap();
        let root = write(
            temp.path(),
            "pom.yaml",
            "groupId: g\nartifactId: root\nmodules: [tools/pom.yml]\n",
        );
        write(temp.path(), "tools/pom.yml", "groupId: g\nartifactId: tools\n");

        let graph = ProjectGraph::load(&root).unwrap();
        assert_eq!(graph.projects().len(), 2);
    }

    #[test]
    fn test_missing_module_descriptor() {
        let temp = TempDir::new().unwrap();
        let root = write(
            temp.path(),
            "pom.yaml",
            "groupId: g\nartifactId: root\nmodules: [missing]\n",
        );
        assert!(matches!(
            ProjectGraph::load(&root),
            Err(Error::Descriptor { .. })
        ));
    }

    #[test]
    fn test_module_cycle_is_detected() {
        let temp = TempDir::new().unwrap();
        let root = write(
            temp.path(),
            "pom.yaml",
            "groupId: g\nartifactId: root\nmodules: [child]\n",
        );
        write(
            temp.path(),
            "child/pom.yaml",
            "groupId: g\nartifactId: child\nmodules: ['..']\n",
        );

        assert!(matches!(
            ProjectGraph::load(&root),
            Err(Error::CycleDetected { .. })
        ));
    }

    #[test]
    fn test_project_without_group_is_rejected() {
        let temp = TempDir::new().unwrap();
        let root = write(temp.path(), "pom.yaml", "artifactId: orphan\n");
        assert!(matches!(
            ProjectGraph::load(&root),
            Err(Error::Descriptor { .. })
        ));
    }

    #[test]
    fn test_from_projects_requires_root() {
        assert!(ProjectGraph::from_projects(Vec::new()).is_err());
    }
}
