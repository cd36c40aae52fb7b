//! Robot-wide numeric constants and device assignments. Nothing functional
//! lives here.

pub mod drivetrain {
    use core::f64::consts::PI;

    pub const PORT_LEFT_FRONT: u8 = 2;
    pub const PORT_LEFT_REAR: u8 = 1;
    pub const PORT_RIGHT_FRONT: u8 = 3;
    pub const PORT_RIGHT_REAR: u8 = 4;

    const METERS_PER_INCH: f64 = 0.0254;

    pub const WHEEL_DIAMETER_INCHES: f64 = 4.0;
    pub const WHEEL_CIRCUMFERENCE_METERS: f64 = WHEEL_DIAMETER_INCHES * METERS_PER_INCH * PI;

    /// Wheel revolutions per motor revolution.
    pub const EXTERNAL_GEAR_RATIO: f64 = 0.6;

    /// Distance between the wheel centerlines.
    pub const TRACK_WIDTH_METERS: f64 = 0.33;

    /// Free-speed ceiling of the drive, used to scale wheel speeds to motor
    /// output.
    pub const MAX_SPEED_MPS: f64 = 1.8;
}

pub mod controller {
    use pros::devices::Controller;

    pub const DRIVER: Controller = Controller::Master;
    pub const OPERATOR: Controller = Controller::Partner;
}

pub mod auto {
    pub const MAX_VELOCITY_MPS: f64 = 1.2;
    pub const MAX_ACCELERATION_MPS2: f64 = 0.8;
}
