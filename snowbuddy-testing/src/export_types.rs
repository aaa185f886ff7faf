use std::borrow::Cow;

use snowbuddy_compass::{
    CardinalDirection, CompassReading, CompassSettings, CompassUiState, CompassView, Friend,
    GeoPoint, HeadingSource, OrientationEvent,
};
use specta::TypeCollection;
use specta_typescript::Typescript;

pub fn main() {
    let args = std::env::args().collect::<Vec<_>>();
    let path = args.get(1).expect("Usage: export-types path");
    let mut lang = Typescript::default();
    lang.header = Cow::Borrowed("/* eslint @typescript-eslint/no-unused-vars: 0 */");
    lang.export_to(
        path,
        &TypeCollection::default()
            .register::<GeoPoint>()
            .register::<OrientationEvent>()
            .register::<HeadingSource>()
            .register::<CardinalDirection>()
            .register::<CompassReading>()
            .register::<CompassView>()
            .register::<CompassUiState>()
            .register::<CompassSettings>()
            .register::<Friend>(),
    )
    .expect("Failed to export types");
    println!("Successfully exported compass types to {path}");
}
