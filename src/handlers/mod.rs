pub mod land_assessment;
