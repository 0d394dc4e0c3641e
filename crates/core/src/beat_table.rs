//! Reference beat offsets for the bundled theme.
//!
//! Note-on times (seconds, nominal tempo) extracted from the theme's MIDI
//! arrangement. Strictly increasing; the final beat runs until
//! [`NOMINAL_DURATION_SECS`].

/// Length of the nominal-tempo recording.
pub const NOMINAL_DURATION_SECS: f64 = 68.62367;

/// Length of one reference quarter note at nominal tempo.
pub const NOMINAL_BEAT_SECS: f64 = 0.857142;

pub const THEME_BEATS: [f64; 172] = [
    0.0,
    0.428571,
    0.6428564999999999,
    0.857142,
    1.0714275,
    1.17857025,
    1.2857129999999999,
    1.4999984999999998,
    1.7142839999999997,
    2.1428549999999995,
    2.3571404999999994,
    2.5714259999999993,
    2.999996999999999,
    3.214282499999999,
    3.428567999999999,
    4.071424499999999,
    4.285709999999999,
    4.714280999999999,
    5.142851999999999,
    5.5714229999999985,
    5.999993999999998,
    6.857135999999998,
    7.499992499999998,
    7.7142779999999975,
    8.142848999999998,
    8.357134499999999,
    8.57142,
    9.2142765,
    9.428562000000001,
    9.857133000000001,
    10.071418500000002,
    10.285704000000003,
    10.714275000000002,
    10.928560500000003,
    11.142846000000004,
    11.571417000000004,
    11.999988000000004,
    12.428559000000003,
    12.857130000000003,
    13.714272000000003,
    14.142843000000003,
    14.357128500000004,
    14.571414000000004,
    14.785699500000005,
    14.892842250000005,
    14.999985000000004,
    15.214270500000005,
    15.428556000000006,
    15.857127000000006,
    16.071412500000005,
    16.285698000000004,
    16.714269000000005,
    16.928554500000004,
    17.142840000000003,
    17.785696500000004,
    17.999982000000003,
    18.428553000000004,
    18.857124000000006,
    19.285695000000008,
    19.71426600000001,
    20.57140800000001,
    21.21426450000001,
    21.42855000000001,
    21.85712100000001,
    22.07140650000001,
    22.285692000000008,
    22.92854850000001,
    23.142834000000008,
    23.57140500000001,
    23.78569050000001,
    23.999976000000007,
    24.42854700000001,
    24.642832500000008,
    24.857118000000007,
    25.28568900000001,
    25.71426000000001,
    26.14283100000001,
    26.571402000000013,
    26.999973000000015,
    28.285686000000016,
    29.142828000000016,
    29.999970000000015,
    30.857112000000015,
    31.714254000000015,
    32.571396000000014,
    33.42853800000002,
    33.857109000000015,
    35.14282200000002,
    35.99996400000002,
    36.85710600000002,
    37.714248000000026,
    38.142819000000024,
    38.57139000000002,
    39.428532000000025,
    40.28567400000003,
    41.57138700000003,
    41.78567250000003,
    41.999958000000035,
    42.21424350000004,
    42.32138625000004,
    42.42852900000004,
    42.64281450000004,
    42.857100000000045,
    43.28567100000004,
    43.499956500000046,
    43.71424200000005,
    44.14281300000005,
    44.35709850000005,
    44.57138400000005,
    45.21424050000005,
    45.428526000000055,
    45.85709700000005,
    46.28566800000005,
    46.71423900000005,
    47.14281000000005,
    47.99995200000005,
    48.64280850000005,
    48.85709400000005,
    49.28566500000005,
    49.499950500000054,
    49.71423600000006,
    50.35709250000006,
    50.57137800000006,
    50.99994900000006,
    51.21423450000006,
    51.42852000000006,
    51.85709100000006,
    52.07137650000006,
    52.285662000000066,
    52.714233000000064,
    53.14280400000006,
    53.57137500000006,
    53.99994600000006,
    54.428517000000056,
    55.28565900000005,
    55.499944500000055,
    55.71423000000006,
    55.92851550000006,
    56.03565825000006,
    56.14280100000006,
    56.357086500000065,
    56.57137200000007,
    56.999943000000066,
    57.21422850000007,
    57.42851400000007,
    57.85708500000007,
    58.07137050000007,
    58.285656000000074,
    58.928512500000075,
    59.14279800000008,
    59.571369000000075,
    59.99994000000007,
    60.42851100000007,
    60.85708200000007,
    61.71422400000007,
    62.35708050000007,
    62.571366000000076,
    62.999937000000074,
    63.214222500000076,
    63.42850800000008,
    64.07136450000007,
    64.28565000000008,
    64.71422100000008,
    64.92850650000008,
    65.14279200000009,
    65.57136300000009,
    65.7856485000001,
    65.9999340000001,
    66.4285050000001,
    66.8570760000001,
    67.28564700000011,
    67.71421800000012,
];
