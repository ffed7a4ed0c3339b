use parking_lot::RwLock;
use std::sync::Arc;

use crate::property::PropertyTable;
use crate::registrant::Registrant;

/// Position on the field in meters with a heading in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pose2d {
    pub x: f64,
    pub y: f64,
    pub heading_degrees: f64,
}

impl Pose2d {
    pub fn new(x: f64, y: f64, heading_degrees: f64) -> Self {
        Self { x, y, heading_degrees }
    }
}

/// A named object drawn on the field, with one or more poses.
#[derive(Debug)]
pub struct FieldObject2d {
    name: String,
    poses: RwLock<Vec<Pose2d>>,
}

impl FieldObject2d {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), poses: RwLock::new(Vec::new()) }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// First pose, or the origin when none is set.
    pub fn pose(&self) -> Pose2d {
        self.poses.read().first().copied().unwrap_or_default()
    }

    pub fn set_pose(&self, pose: Pose2d) {
        self.set_poses(vec![pose]);
    }

    pub fn poses(&self) -> Vec<Pose2d> {
        self.poses.read().clone()
    }

    pub fn set_poses(&self, poses: Vec<Pose2d>) {
        *self.poses.write() = poses;
    }

    /// Poses flattened to `[x, y, heading_degrees, ...]`.
    pub fn as_double_array(&self) -> Vec<f64> {
        self.poses.read().iter().flat_map(|p| [p.x, p.y, p.heading_degrees]).collect()
    }
}

/// A 2D field with a `Robot` object and any number of extra objects.
#[derive(Debug)]
pub struct Field2d {
    objects: RwLock<Vec<Arc<FieldObject2d>>>,
}

impl Field2d {
    pub const ROBOT: &'static str = "Robot";

    pub fn new() -> Self {
        let robot = FieldObject2d::new(Self::ROBOT);
        robot.set_pose(Pose2d::default());
        Self { objects: RwLock::new(vec![Arc::new(robot)]) }
    }

    pub fn robot_pose(&self) -> Pose2d {
        self.robot().pose()
    }

    pub fn set_robot_pose(&self, pose: Pose2d) {
        self.robot().set_pose(pose);
    }

    fn robot(&self) -> Arc<FieldObject2d> {
        self.object(Self::ROBOT).unwrap_or_else(|| self.object_or_insert(Self::ROBOT))
    }

    pub fn object(&self, name: &str) -> Option<Arc<FieldObject2d>> {
        self.objects.read().iter().find(|o| o.name == name).cloned()
    }

    /// Object named `name`, created empty if missing.
    pub fn object_or_insert(&self, name: &str) -> Arc<FieldObject2d> {
        let mut objects = self.objects.write();
        if let Some(existing) = objects.iter().find(|o| o.name == name) {
            return Arc::clone(existing);
        }
        let object = Arc::new(FieldObject2d::new(name));
        objects.push(Arc::clone(&object));
        object
    }
}

impl Default for Field2d {
    fn default() -> Self {
        Self::new()
    }
}

impl Registrant for Field2d {
    fn populate(&self, table: &mut PropertyTable) {
        table.set_type("Field2d");
        for object in self.objects.read().iter() {
            let object = Arc::clone(object);
            let key = object.name.clone();
            table.add_read_only(&key, move || object.as_double_array());
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use witty_types::Value;

    #[test]
    fn test_robot_starts_at_origin() {
        let field = Field2d::new();
        assert_eq!(field.robot_pose(), Pose2d::default());

        let mut table = PropertyTable::new();
        field.populate(&mut table);
        assert_eq!(table.get("Robot").unwrap().read(), Value::DoubleArray(vec![0.0, 0.0, 0.0]));
    }

    #[test]
    fn test_objects_publish_pose_triples() {
        let field = Field2d::new();
        field.set_robot_pose(Pose2d::new(1.5, 2.0, 90.0));
        field
            .object_or_insert("Cones")
            .set_poses(vec![Pose2d::new(0.5, 0.5, 0.0), Pose2d::new(3.0, 1.0, 180.0)]);

        let mut table = PropertyTable::new();
        field.populate(&mut table);

        assert_eq!(table.type_tag(), Some("Field2d"));
        assert_eq!(table.get("Robot").unwrap().read(), Value::DoubleArray(vec![1.5, 2.0, 90.0]));
        assert_eq!(
            table.get("Cones").unwrap().read(),
            Value::DoubleArray(vec![0.5, 0.5, 0.0, 3.0, 1.0, 180.0])
        );
        assert!(Arc::ptr_eq(&field.object_or_insert("Cones"), &field.object("Cones").unwrap()));
    }
}
